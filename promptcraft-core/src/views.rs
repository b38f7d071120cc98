//! Derived read-only views over the history. Computed by consumers on
//! the in-memory copy, never stored.

use crate::models::{Category, HistoryItem, HistoryStats};

/// Keep only items with the given category; `None` means "All".
pub fn filter_by_category(items: &[HistoryItem], category: Option<Category>) -> Vec<HistoryItem> {
    match category {
        Some(wanted) => items
            .iter()
            .filter(|item| item.category == wanted)
            .cloned()
            .collect(),
        None => items.to_vec(),
    }
}

/// Case-insensitive substring match against the original or optimized
/// prompt. An empty query matches everything.
pub fn search(items: &[HistoryItem], query: &str) -> Vec<HistoryItem> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.original_prompt.to_lowercase().contains(&needle)
                || item.optimized_prompt.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// The `n` most recent items; the list is already newest first.
pub fn recent(items: &[HistoryItem], n: usize) -> &[HistoryItem] {
    &items[..items.len().min(n)]
}

pub fn stats(items: &[HistoryItem]) -> HistoryStats {
    let ratings: Vec<u8> = items.iter().filter_map(|item| item.rating).collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64)
    };

    HistoryStats {
        total: items.len(),
        bookmarked: items.iter().filter(|item| item.is_bookmarked).count(),
        average_rating,
    }
}
