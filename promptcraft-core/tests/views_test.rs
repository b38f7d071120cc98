use promptcraft_core::models::{Category, OptimizationResult};
use promptcraft_core::{views, HistoryStore};

fn sample_result(prompt: &str, optimized: &str, category: Category) -> OptimizationResult {
    OptimizationResult {
        original_prompt: prompt.to_string(),
        category,
        optimized_prompt: optimized.to_string(),
        analysis_notes: String::new(),
        improvements: Vec::new(),
        rating: None,
    }
}

#[test]
fn category_filter_returns_exact_matches_in_order() {
    let store = HistoryStore::in_memory().unwrap();
    let a = store
        .append(sample_result("a", "a+", Category::General))
        .unwrap();
    store
        .append(sample_result("b", "b+", Category::CodeGeneration))
        .unwrap();
    let c = store
        .append(sample_result("c", "c+", Category::General))
        .unwrap();

    let filtered = views::filter_by_category(&store.list(), Some(Category::General));
    let ids: Vec<&str> = filtered.iter().map(|item| item.id.as_str()).collect();
    // two matches, most recent first
    assert_eq!(ids, vec![c.id.as_str(), a.id.as_str()]);
}

#[test]
fn all_filter_returns_unfiltered_set() {
    let store = HistoryStore::in_memory().unwrap();
    store
        .append(sample_result("a", "a+", Category::General))
        .unwrap();
    store
        .append(sample_result("b", "b+", Category::DataAnalysis))
        .unwrap();

    let all = views::filter_by_category(&store.list(), None);
    assert_eq!(all.len(), 2);
}

#[test]
fn search_is_case_insensitive_over_both_prompts() {
    let store = HistoryStore::in_memory().unwrap();
    store
        .append(sample_result(
            "Write a SQL query",
            "You are a database expert...",
            Category::DataAnalysis,
        ))
        .unwrap();
    store
        .append(sample_result(
            "summarize this",
            "Act as an editor and produce a SQL-free summary",
            Category::General,
        ))
        .unwrap();
    store
        .append(sample_result("draw a cat", "Sketch a cat", Category::CreativeWriting))
        .unwrap();

    // matches the first via original_prompt and the second via optimized_prompt
    let hits = views::search(&store.list(), "sql");
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|item| item.original_prompt != "draw a cat"));
}

#[test]
fn empty_query_matches_everything() {
    let store = HistoryStore::in_memory().unwrap();
    store
        .append(sample_result("a", "a+", Category::General))
        .unwrap();

    assert_eq!(views::search(&store.list(), "").len(), 1);
}

#[test]
fn search_and_category_filter_compose() {
    let store = HistoryStore::in_memory().unwrap();
    store
        .append(sample_result("refactor rust code", "r1", Category::CodeGeneration))
        .unwrap();
    store
        .append(sample_result("rust essay", "r2", Category::CreativeWriting))
        .unwrap();

    let narrowed = views::search(
        &views::filter_by_category(&store.list(), Some(Category::CodeGeneration)),
        "rust",
    );
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].original_prompt, "refactor rust code");
}

#[test]
fn recent_caps_at_available_items() {
    let store = HistoryStore::in_memory().unwrap();
    for i in 0..3 {
        store
            .append(sample_result(&format!("p{i}"), "o", Category::General))
            .unwrap();
    }

    let history = store.list();
    assert_eq!(views::recent(&history, 5).len(), 3);
    assert_eq!(views::recent(&history, 2).len(), 2);
    assert_eq!(views::recent(&history, 2)[0].original_prompt, "p2");
}

#[test]
fn stats_aggregate_totals_bookmarks_and_mean_rating() {
    let store = HistoryStore::in_memory().unwrap();
    let mut rated = sample_result("a", "a+", Category::General);
    rated.rating = Some(4);
    let first = store.append(rated).unwrap();

    let mut rated = sample_result("b", "b+", Category::General);
    rated.rating = Some(2);
    store.append(rated).unwrap();

    // unrated item must not drag the mean down
    store
        .append(sample_result("c", "c+", Category::General))
        .unwrap();

    store.toggle_bookmark(&first.id).unwrap();

    let stats = views::stats(&store.list());
    assert_eq!(stats.total, 3);
    assert_eq!(stats.bookmarked, 1);
    assert_eq!(stats.average_rating, Some(3.0));
}

#[test]
fn stats_with_no_rated_items_has_no_average() {
    let store = HistoryStore::in_memory().unwrap();
    store
        .append(sample_result("a", "a+", Category::General))
        .unwrap();

    let stats = views::stats(&store.list());
    assert_eq!(stats.total, 1);
    assert_eq!(stats.average_rating, None);
}
