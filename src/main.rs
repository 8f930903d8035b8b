use std::fs;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use feedwatch::cli::{Cli, Commands, SettingsCommand};
use feedwatch::config::Config;
use feedwatch::domain::{BatchKind, FeedId, FeedStatus};
use feedwatch::errors::{FeedwatchError, FeedwatchResult};
use feedwatch::fetch::HttpFetcher;
use feedwatch::parser::FeedRsParser;
use feedwatch::services::{
    BatchOrchestrator, FeedContext, FeedService, ImportExportService, RefreshOptions,
    SettingsService,
};
use feedwatch::storage::{SqliteBookmarkRepository, SqliteKeyValueRepository, SqliteStorage};
use feedwatch::ui::{ConsoleSurface, UiSurface};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feedwatch=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

struct App {
    config: Config,
    ctx: FeedContext,
    ui: Arc<dyn UiSurface>,
}

impl App {
    fn feeds(&self) -> FeedService {
        FeedService::new(self.ctx.clone(), self.ui.clone())
    }

    fn orchestrator(&self) -> BatchOrchestrator {
        BatchOrchestrator::new(self.ctx.clone(), self.ui.clone(), self.config.concurrency)
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(cli.db.clone()).context("loading configuration")?;

    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("opening database {}", config.db_path))?;
    let fetcher = HttpFetcher::new(config.request_timeout, &config.user_agent)?;

    let ctx = FeedContext::new(
        Arc::new(SqliteBookmarkRepository::new(storage.clone())),
        Arc::new(SqliteKeyValueRepository::new(storage)),
        Arc::new(fetcher),
        Arc::new(FeedRsParser::new()),
    )
    .with_options(RefreshOptions {
        max_redirect_hops: config.max_redirect_hops,
    });
    let ui: Arc<dyn UiSurface> = Arc::new(ConsoleSurface::new(config.output_dir.clone()));

    let app = App { config, ctx, ui };

    match cli.command {
        Commands::AddCollection { title } => cmd_add_collection(&app, &title)?,
        Commands::RemoveCollection { collection } => cmd_remove_collection(&app, &collection)?,
        Commands::Add {
            collection,
            url,
            title,
            no_verify,
        } => cmd_add(&app, &collection, &url, title.as_deref(), !no_verify).await?,
        Commands::Remove { feed } => cmd_remove(&app, &feed)?,
        Commands::List => cmd_list(&app)?,
        Commands::Check { collection } => cmd_batch(&app, BatchKind::Check, &collection).await?,
        Commands::Open { collection } => cmd_batch(&app, BatchKind::OpenAll, &collection).await?,
        Commands::Unify { collection } => cmd_batch(&app, BatchKind::Unify, &collection).await?,
        Commands::OpenFeed { feed } => cmd_open_feed(&app, &feed).await?,
        Commands::MarkRead { target, all } => cmd_mark(&app, &target, all, FeedStatus::Old)?,
        Commands::MarkUpdated { target, all } => {
            cmd_mark(&app, &target, all, FeedStatus::Updated)?
        }
        Commands::Import { path, collection } => cmd_import(&app, &path, &collection)?,
        Commands::Export { output } => cmd_export(&app, output)?,
        Commands::Settings { command } => cmd_settings(&app, command)?,
    }

    Ok(())
}

fn cmd_add_collection(app: &App, title: &str) -> FeedwatchResult<()> {
    match app.feeds().add_collection(title) {
        Ok(collection) => {
            println!("Collection added: {} (id {})", collection.title, collection.id);
            Ok(())
        }
        Err(FeedwatchError::CollectionAlreadyExists(title)) => {
            println!("Collection already exists: {}", title);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_remove_collection(app: &App, key: &str) -> FeedwatchResult<()> {
    let service = app.feeds();
    let collection = service.find_collection(key)?;
    service.remove_collection(collection.id)?;
    println!("Removed collection: {}", collection.title);
    Ok(())
}

async fn cmd_add(
    app: &App,
    collection: &str,
    url: &str,
    title: Option<&str>,
    verify: bool,
) -> FeedwatchResult<()> {
    let service = app.feeds();
    let collection = service.find_collection(collection)?;

    if verify {
        println!("Validating feed: {}", url);
    }

    match service.add_feed(collection.id, url, title, verify).await {
        Ok(bookmark) => {
            println!("Feed added successfully!");
            println!("  Id: {}", bookmark.id);
            println!("  Title: {}", bookmark.title);
            println!("  Collection: {}", collection.title);
            Ok(())
        }
        Err(FeedwatchError::FeedAlreadyExists(_)) => {
            println!("Feed already exists in {}: {}", collection.title, url);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn cmd_remove(app: &App, feed: &str) -> FeedwatchResult<()> {
    let bookmark = app.feeds().remove_feed(&FeedId::from(feed))?;
    println!("Removed: {}", bookmark.title);
    Ok(())
}

fn cmd_list(app: &App) -> FeedwatchResult<()> {
    let listings = app.feeds().list()?;

    if listings.is_empty() {
        println!("No collections configured.");
        return Ok(());
    }

    for listing in listings {
        println!("[{}] {}", listing.collection.id, listing.collection.title);

        if listing.feeds.is_empty() {
            println!("    (no feeds)");
        }
        for (bookmark, stored) in listing.feeds {
            println!(
                "  {:>4}. {} [{}]",
                bookmark.id,
                bookmark.title,
                stored.status
            );
            println!("        URL: {}", bookmark.url);
            if let Some(error) = stored.last_error {
                println!("        Error: {}", error);
            }
        }
        println!();
    }

    Ok(())
}

async fn cmd_batch(app: &App, kind: BatchKind, collection: &str) -> FeedwatchResult<()> {
    let collection = app.feeds().find_collection(collection)?;

    let Some(report) = app.orchestrator().run(kind, collection.id).await? else {
        println!("Another batch is still running.");
        return Ok(());
    };

    if report.processed() == 0 && kind != BatchKind::Check {
        println!("No unread feeds in {}.", report.collection_title);
        return Ok(());
    }

    for outcome in report.outcomes.iter().filter(|o| o.is_error()) {
        println!(
            "  ! {}: {}",
            outcome.title,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    match kind {
        BatchKind::Check => println!(
            "Checked {} feeds: {} updated, {} failed",
            report.processed(),
            report.updated,
            report.failed
        ),
        BatchKind::OpenAll => println!(
            "Opened {} feeds, {} failed",
            report.processed() - report.failed,
            report.failed
        ),
        BatchKind::Unify => println!(
            "Merged {} items from {} feeds into {}",
            report.unified_items.len(),
            report.processed() - report.failed,
            report.collection_title
        ),
    }

    Ok(())
}

async fn cmd_open_feed(app: &App, feed: &str) -> FeedwatchResult<()> {
    let outcome = app.orchestrator().open_feed(&FeedId::from(feed)).await?;

    if let Some(error) = outcome.error {
        println!("Could not open {}: {}", outcome.title, error);
    }
    Ok(())
}

fn cmd_mark(app: &App, target: &str, all: bool, status: FeedStatus) -> FeedwatchResult<()> {
    let service = app.feeds();
    let label = match status {
        FeedStatus::Updated => "updated",
        _ => "read",
    };

    if all {
        let collection = service.find_collection(target)?;
        let changed = match status {
            FeedStatus::Updated => service.mark_all_updated(collection.id)?,
            _ => service.mark_all_read(collection.id)?,
        };
        println!("Marked {} feeds of {} as {}", changed, collection.title, label);
    } else {
        let id = FeedId::from(target);
        match status {
            FeedStatus::Updated => service.mark_updated(&id)?,
            _ => service.mark_read(&id)?,
        }
        println!("Marked feed {} as {}", id, label);
    }

    Ok(())
}

fn cmd_import(app: &App, path: &str, collection: &str) -> FeedwatchResult<()> {
    let content = fs::read_to_string(path)?;
    let service = ImportExportService::new(app.ctx.bookmarks.clone());

    println!("Importing feeds from {}...\n", path);

    let result = service.import_opml(&content, collection)?;

    if !result.added.is_empty() {
        println!("Added {} feeds:", result.added.len());
        for bookmark in &result.added {
            println!("  + {}", bookmark.title);
        }
        println!();
    }

    if !result.duplicates.is_empty() {
        println!("Skipped {} duplicates:", result.duplicates.len());
        for url in &result.duplicates {
            println!("  - {}", url);
        }
        println!();
    }

    if !result.invalid.is_empty() {
        println!("Failed {} feeds:", result.invalid.len());
        for (url, error) in &result.invalid {
            println!("  ! {}: {}", url, error);
        }
        println!();
    }

    println!(
        "Import complete: {} added, {} duplicates, {} failed",
        result.added.len(),
        result.duplicates.len(),
        result.invalid.len()
    );

    Ok(())
}

fn cmd_export(app: &App, output: Option<String>) -> FeedwatchResult<()> {
    let service = ImportExportService::new(app.ctx.bookmarks.clone());
    let opml = service.export_opml()?;

    match output {
        Some(path) => {
            fs::write(&path, &opml)?;
            println!("Exported feeds to {}", path);
        }
        None => {
            println!("{}", opml);
        }
    }

    Ok(())
}

fn cmd_settings(app: &App, command: SettingsCommand) -> FeedwatchResult<()> {
    let service = SettingsService::new(app.ctx.store.clone());

    match command {
        SettingsCommand::Show => {
            for (key, value) in service.entries()? {
                println!("{} = {}", key, value);
            }
        }
        SettingsCommand::Set { key, value } => {
            service.set(&key, value)?;
            println!("{} = {}", key, value);
        }
    }

    Ok(())
}
