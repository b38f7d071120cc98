use clap::{Parser, Subcommand};
use promptcraft_core::views;
use promptcraft_core::{Category, HistoryItem, HistoryStore, PromptOptimizer, MAX_PROMPT_LEN};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptcraft")]
#[command(about = "Optimize prompts with Gemini and browse the local optimization history")]
#[command(version)]
struct Cli {
    /// Path to the history database (defaults to ~/.local/share/promptcraft/promptcraft.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a prompt and store the result in the history
    Optimize {
        /// The prompt text to optimize (max 5000 characters)
        prompt: String,

        /// Category context: General, Code Generation, Creative Writing,
        /// Data Analysis, Business Communication or Educational Content
        #[arg(long, default_value = "General")]
        category: String,

        /// Gemini model override (defaults to gemini-2.5-flash)
        #[arg(long)]
        model: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List history items, newest first
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the history for a substring of the original or optimized prompt
    Search {
        /// Search query (case-insensitive)
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the most recent history items
    Recent {
        /// Number of items to show
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle the bookmark flag on an item
    Bookmark {
        /// The history item ID
        id: String,
    },

    /// Delete an item by ID
    Delete {
        /// The history item ID
        id: String,
    },

    /// Delete the entire history
    Clear,

    /// Show aggregate history statistics
    Stats,

    /// Show history database path
    DbPath,
}

fn get_store(db_path: Option<PathBuf>) -> Result<HistoryStore, String> {
    match db_path {
        Some(path) => HistoryStore::with_path(&path),
        None => HistoryStore::new(),
    }
    .map_err(|e| e.to_string())
}

fn parse_category(label: &str) -> Result<Category, String> {
    label.parse()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Optimize {
            prompt,
            category,
            model,
            json,
        } => {
            let prompt = prompt.trim().to_string();
            if prompt.is_empty() {
                return Err("prompt must not be empty".to_string());
            }
            if prompt.chars().count() > MAX_PROMPT_LEN {
                return Err(format!("prompt exceeds the {MAX_PROMPT_LEN} character limit"));
            }
            let category = parse_category(&category)?;

            let mut optimizer = PromptOptimizer::from_env().map_err(|e| e.to_string())?;
            if let Some(model) = model {
                optimizer = optimizer.with_model(model);
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| format!("failed to start async runtime: {e}"))?;

            let result = match runtime.block_on(optimizer.optimize(&prompt, category)) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "optimization failed");
                    return Err(e.user_message().to_string());
                }
            };

            let store = get_store(cli.db)?;
            let item = store.append(result).map_err(|e| e.to_string())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&item).unwrap());
            } else {
                print_result(&item);
            }
            Ok(())
        }

        Commands::List { category, json } => {
            let store = get_store(cli.db)?;
            let category = category.map(|c| parse_category(&c)).transpose()?;
            let items = views::filter_by_category(&store.list(), category);
            print_items(&items, json);
            Ok(())
        }

        Commands::Search { query, json } => {
            let store = get_store(cli.db)?;
            let items = views::search(&store.list(), &query);
            if items.is_empty() && !json {
                println!("No items matching '{query}'");
                return Ok(());
            }
            print_items(&items, json);
            Ok(())
        }

        Commands::Recent { limit, json } => {
            let store = get_store(cli.db)?;
            let history = store.list();
            let items = views::recent(&history, limit);
            print_items(items, json);
            Ok(())
        }

        Commands::Bookmark { id } => {
            let store = get_store(cli.db)?;
            let history = store.toggle_bookmark(&id).map_err(|e| e.to_string())?;
            match history.iter().find(|item| item.id == id) {
                Some(item) if item.is_bookmarked => println!("Item {id} bookmarked"),
                Some(_) => println!("Item {id} unbookmarked"),
                None => {
                    eprintln!("Item {id} not found");
                    std::process::exit(1);
                }
            }
            Ok(())
        }

        Commands::Delete { id } => {
            let store = get_store(cli.db)?;
            let before = store.list().len();
            let history = store.delete(&id).map_err(|e| e.to_string())?;
            if history.len() < before {
                println!("Item {id} deleted");
            } else {
                eprintln!("Item {id} not found");
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Clear => {
            let store = get_store(cli.db)?;
            store.clear().map_err(|e| e.to_string())?;
            println!("History cleared");
            Ok(())
        }

        Commands::Stats => {
            let store = get_store(cli.db)?;
            let stats = views::stats(&store.list());
            println!("Total optimizations:   {}", stats.total);
            println!("Saved favorites:       {}", stats.bookmarked);
            match stats.average_rating {
                Some(avg) => println!("Avg. original quality: {avg:.1}/5"),
                None => println!("Avg. original quality: -"),
            }
            Ok(())
        }

        Commands::DbPath => {
            match cli.db {
                Some(path) => println!("{}", path.display()),
                None => println!("{}", HistoryStore::db_path().map_err(|e| e.to_string())?.display()),
            }
            Ok(())
        }
    }
}

fn print_result(item: &HistoryItem) {
    println!("Category: {}", item.category);
    if let Some(rating) = item.rating {
        println!("Original quality: {rating}/5");
    }
    println!("\nOptimized prompt:\n{}", item.optimized_prompt);
    if !item.analysis_notes.is_empty() {
        println!("\nAnalysis:\n{}", item.analysis_notes);
    }
    if !item.improvements.is_empty() {
        println!("\nImprovements:");
        for improvement in &item.improvements {
            println!("  - {}: {}", improvement.kind, improvement.description);
        }
    }
    println!("\nSaved as {}", item.id);
}

fn print_items(items: &[HistoryItem], json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(items).unwrap());
        return;
    }
    if items.is_empty() {
        println!("No history items found");
        return;
    }
    let header = format!(
        "{:<38} {:<12} {:<24} {:<7} {:<4} {}",
        "ID", "DATE", "CATEGORY", "RATING", "FAV", "PROMPT"
    );
    println!("{header}");
    println!("{}", "-".repeat(110));
    for item in items {
        let date = chrono::DateTime::from_timestamp_millis(item.timestamp)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let rating = item
            .rating
            .map(|r| format!("{r}/5"))
            .unwrap_or_else(|| "-".to_string());
        let fav = if item.is_bookmarked { "*" } else { "" };
        let prompt_display = if item.original_prompt.chars().count() > 40 {
            let truncated: String = item.original_prompt.chars().take(37).collect();
            format!("{truncated}...")
        } else {
            item.original_prompt.clone()
        };
        println!(
            "{:<38} {:<12} {:<24} {:<7} {:<4} {}",
            item.id,
            date,
            item.category.as_str(),
            rating,
            fav,
            prompt_display
        );
    }
    println!("\nTotal: {} items", items.len());
}
