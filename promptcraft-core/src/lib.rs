pub mod db;
pub mod error;
pub mod gemini;
pub mod models;
pub mod views;

pub use db::HistoryStore;
pub use error::{OptimizeError, StoreError};
pub use gemini::PromptOptimizer;
pub use models::{
    Category, HistoryItem, HistoryStats, Improvement, OptimizationResult, MAX_PROMPT_LEN,
};
