//! Newsroom CLI
//!
//! Local execution entry point for crawling, updating and translating the
//! content store.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use newsroom::{
    error::{AppError, Result},
    models::{Category, Config, Language},
    pipeline::{Synchronizer, TranslationJob},
    services::ChatTranslator,
    storage::{LocalStorage, NewsStorage},
    utils::http,
};

/// Newsroom - news listing scraper
#[derive(Parser, Debug)]
#[command(
    name = "newsroom",
    version,
    about = "Scrapes a paginated news listing into a JSON content store"
)]
struct Cli {
    /// Path to storage directory containing config and content files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Config file (default: {storage_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the whole listing and fetch every missing article
    Backfill {
        /// Reuse the stored news list instead of crawling the listing first
        #[arg(long)]
        from_list: bool,
    },

    /// Fetch only items newer than the stored news list
    Update,

    /// Translate stored articles into the configured languages
    Translate {
        /// Translate into this language only
        #[arg(long)]
        lang: Option<Language>,
    },

    /// Print stored articles of one category
    List {
        lang: Language,
        /// Category label or URI segment, e.g. `remarks`
        category: Category,
    },

    /// Validate configuration
    Validate,

    /// Show content store info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.storage_dir.join("config.toml"));
    let config = Config::load_or_default(&config_path);
    let contents_root = config.paths.contents_root(&cli.storage_dir);
    let storage = Arc::new(LocalStorage::new(&contents_root));

    log::debug!("Content store at {}", contents_root.display());

    match cli.command {
        Command::Backfill { from_list } => {
            let sync = Synchronizer::from_config(&config, storage.clone())?;

            let abstracts = if from_list {
                log::info!("Reusing the stored news list");
                storage.load_abstracts_or_empty().await
            } else {
                log::info!("Step 1/2: Crawling the news listing...");
                let report = sync.crawl_list().await;
                if report.walk.abstracts.is_empty() {
                    storage.load_abstracts_or_empty().await
                } else {
                    report.walk.abstracts
                }
            };

            log::info!("Step 2/2: Fetching articles for {} news items...", abstracts.len());
            let report = sync.backfill(&abstracts).await;
            log::info!("Backfill complete: {report}");
        }

        Command::Update => {
            let sync = Synchronizer::from_config(&config, storage.clone())?;
            let report = sync.update().await;
            log::info!(
                "Update complete: {} new news items, {}",
                report.list.walk.abstracts.len(),
                report.contents
            );
        }

        Command::Translate { lang } => {
            let languages = lang.map_or_else(|| config.translation.languages.clone(), |l| vec![l]);
            let client = http::create_async_client(&config.crawler)?;
            let translator = ChatTranslator::from_config(client, &config.translation)?;
            let job = TranslationJob::from_config(&config.translation, storage.clone(), Arc::new(translator));

            let mut failed = 0;
            for (lang, result) in job.run_all(&languages).await {
                match result {
                    Ok(report) => log::info!("{lang}: {report}"),
                    Err(e) => {
                        log::error!("{lang}: translation failed: {e}");
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                return Err(AppError::translation(format!("{failed} language(s) failed")));
            }
        }

        Command::List { lang, category } => {
            let articles = storage.articles_by_category(lang, category).await;
            log::info!(
                "{} {} articles in {lang}",
                articles.len(),
                category.localized(lang)
            );
            for article in articles {
                println!("{}  {}  {}", article.date, article.slug, article.title);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (crawler, paths, selectors, translation)");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!("Content store: {}", storage.root().display());
            log::info!("Origin: {}", config.crawler.origin);

            let list = storage.load_abstracts_or_empty().await;
            match list.first() {
                Some(newest) => log::info!(
                    "News list: {} items, newest {} ({})",
                    list.len(),
                    newest.slug,
                    newest.date
                ),
                None => log::info!("News list: empty"),
            }
            for lang in Language::ALL {
                let contents = storage.load_contents_or_empty(lang).await;
                log::info!("{lang}/contents.json: {} articles", contents.len());
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
