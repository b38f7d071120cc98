use serde::{Deserialize, Serialize};

/// Maximum accepted prompt length, enforced at the submission surface.
pub const MAX_PROMPT_LEN: usize = 5000;

/// Fixed set of labels classifying the intended use of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    General,
    #[serde(rename = "Code Generation")]
    CodeGeneration,
    #[serde(rename = "Creative Writing")]
    CreativeWriting,
    #[serde(rename = "Data Analysis")]
    DataAnalysis,
    #[serde(rename = "Business Communication")]
    BusinessCommunication,
    #[serde(rename = "Educational Content")]
    EducationalContent,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::CodeGeneration,
        Category::CreativeWriting,
        Category::DataAnalysis,
        Category::BusinessCommunication,
        Category::EducationalContent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::CodeGeneration => "Code Generation",
            Category::CreativeWriting => "Creative Writing",
            Category::DataAnalysis => "Data Analysis",
            Category::BusinessCommunication => "Business Communication",
            Category::EducationalContent => "Educational Content",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| {
                let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", labels.join(", "))
            })
    }
}

/// One specific change the optimizer made, e.g. 'Clarity' or 'Context'.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// Outcome of one optimization call, before it is persisted.
///
/// `rating` is the quality score the service assigns to the *original*
/// prompt; `None` means "not rated", never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub original_prompt: String,
    pub category: Category,
    pub optimized_prompt: String,
    pub analysis_notes: String,
    pub improvements: Vec<Improvement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

/// A persisted optimization record. Field names serialize in camelCase
/// so the stored layout matches the original application's records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: i64,
    pub is_bookmarked: bool,
    pub original_prompt: String,
    pub category: Category,
    pub optimized_prompt: String,
    pub analysis_notes: String,
    pub improvements: Vec<Improvement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

/// Aggregates derived from the history, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub bookmarked: usize,
    /// Mean rating over rated items only; `None` when nothing is rated.
    pub average_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn unknown_category_label_is_rejected() {
        assert!("Poetry".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_as_display_label() {
        let json = serde_json::to_string(&Category::CodeGeneration).unwrap();
        assert_eq!(json, "\"Code Generation\"");
    }

    #[test]
    fn history_item_uses_original_field_layout() {
        let item = HistoryItem {
            id: "abc".to_string(),
            timestamp: 1700000000000,
            is_bookmarked: true,
            original_prompt: "write code".to_string(),
            category: Category::General,
            optimized_prompt: "write better code".to_string(),
            analysis_notes: "notes".to_string(),
            improvements: vec![Improvement {
                kind: "Clarity".to_string(),
                description: "tightened".to_string(),
            }],
            rating: None,
        };

        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("originalPrompt").is_some());
        assert!(value.get("optimizedPrompt").is_some());
        assert!(value.get("analysisNotes").is_some());
        assert_eq!(value["isBookmarked"], serde_json::json!(true));
        assert_eq!(value["improvements"][0]["type"], "Clarity");
        // absent rating is omitted, not null
        assert!(value.get("rating").is_none());
    }
}
