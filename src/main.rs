use anyhow::{Context, Result};
use recipe_feed::catalog::mealdb::MealDbClient;
use recipe_feed::catalog::sources::{SavedList, SingleCategory};
use recipe_feed::catalog::Catalog;
use recipe_feed::config::{Config, FeedConfig};
use recipe_feed::engine::{FeedController, PageOutcome};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_PAGES: usize = 3;

/// Which browse view to drive.
enum View {
    All,
    Category(String),
    Saved(Vec<String>),
}

struct Args {
    view: View,
    pages: usize,
    config_path: PathBuf,
    json: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args {
        view: View::All,
        pages: DEFAULT_PAGES,
        config_path: PathBuf::from("config.toml"),
        json: false,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--category" => {
                let name = args.next().context("--category needs a name")?;
                parsed.view = View::Category(name);
            }
            "--saved" => {
                let ids = args.next().context("--saved needs a comma-separated id list")?;
                parsed.view = View::Saved(ids.split(',').map(str::to_string).collect());
            }
            "--pages" => {
                let n = args.next().context("--pages needs a number")?;
                parsed.pages = n.parse().with_context(|| format!("invalid --pages value: {}", n))?;
            }
            "--config" => {
                parsed.config_path = PathBuf::from(args.next().context("--config needs a path")?);
            }
            "--json" => parsed.json = true,
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

/// Request pages until `pages` have completed or the feed stops accepting requests.
async fn drive<C: Catalog>(controller: &FeedController<C>, pages: usize) {
    for _ in 0..pages {
        match controller.request_next_page().await {
            PageOutcome::Loaded(report) => {
                tracing::info!(page = report.page_index, added = report.added, "page loaded");
            }
            PageOutcome::Exhausted(report) => {
                tracing::info!(page = report.page_index, added = report.added, "no more recipes");
                break;
            }
            PageOutcome::Failed(e) => {
                eprintln!("  Failed to load recipes: {}", e);
                break;
            }
            PageOutcome::Skipped(state) => {
                tracing::warn!(?state, "page request skipped");
                break;
            }
        }
    }
}

async fn run<C: Catalog>(controller: FeedController<C>, args: &Args) -> Result<()> {
    drive(&controller, args.pages).await;
    let partitions = controller.partitions().map_or(0, |p| p.len());
    let feed = controller.feed_state();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&feed)?);
        return Ok(());
    }
    for item in &feed.items {
        println!("  #{:<3} [{}] {}", item.sequence_index, item.partition_id, item.title);
    }
    println!();
    println!(
        "  {} recipes from {} categories, next page {}{}",
        feed.items.len(),
        partitions,
        feed.current_page_index,
        if feed.exhausted { " (end of feed)" } else { "" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("recipe_feed=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    // Missing config file falls back to built-in defaults.
    let config = if args.config_path.exists() {
        Config::load(&args.config_path)?
    } else {
        tracing::debug!(path = %args.config_path.display(), "no config file, using defaults");
        Config::default()
    };
    Config::load_env_file();

    let client = MealDbClient::new(&config.catalog, &Config::api_key());

    // The item cap only makes sense for the cross-category scan; single
    // partition views end on their first under-filled page.
    let single_partition = FeedConfig {
        cap_pages_per_partition: None,
        ..config.feed.clone()
    };

    match &args.view {
        View::All => run(FeedController::new(client, config.feed.clone()), &args).await,
        View::Category(name) => {
            run(FeedController::new(SingleCategory::new(client, name), single_partition), &args).await
        }
        View::Saved(ids) => {
            let source = SavedList::new(client, ids.iter().cloned());
            if source.is_empty() {
                anyhow::bail!("--saved list is empty");
            }
            run(FeedController::new(source, single_partition), &args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let parsed = args(&[]).unwrap();
        assert!(matches!(parsed.view, View::All));
        assert_eq!(parsed.pages, DEFAULT_PAGES);
        assert!(!parsed.json);
    }

    #[test]
    fn test_category_and_pages() {
        let parsed = args(&["--category", "Seafood", "--pages", "5"]).unwrap();
        assert!(matches!(parsed.view, View::Category(ref c) if c == "Seafood"));
        assert_eq!(parsed.pages, 5);
    }

    #[test]
    fn test_saved_ids() {
        let parsed = args(&["--saved", "52772,52874", "--json"]).unwrap();
        match parsed.view {
            View::Saved(ids) => assert_eq!(ids, vec!["52772", "52874"]),
            _ => panic!("expected saved view"),
        }
        assert!(parsed.json);
    }

    #[test]
    fn test_bad_args() {
        assert!(args(&["--pages", "many"]).is_err());
        assert!(args(&["--category"]).is_err());
        assert!(args(&["--bogus"]).is_err());
    }
}
