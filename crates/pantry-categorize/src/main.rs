//! Pantry categorization operator CLI.
//!
//! Usage:
//!   pantry-categorize migrate
//!   pantry-categorize seed
//!   pantry-categorize resolve "Frische Milch" "Quantum Widget"
//!   pantry-categorize correct "fresh apple" 3

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pantry_categorize::cli::{Cli, Commands};
use pantry_categorize::{Categorizer, CategorizerConfig};
use pantry_db::{log_pool_metrics, Database, PoolConfig};
use pantry_inference::{create_classifier, ClassifierConfig};

fn init_tracing() {
    // LOG_FORMAT - "json" or "text" (default: "text")
    // RUST_LOG   - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "pantry_categorize=info,pantry_inference=info,pantry_db=info".into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = Database::connect_with_config(&database_url, PoolConfig::from_env()?)
        .await
        .context("Failed to connect to database")?;
    log_pool_metrics(db.pool());

    match cli.command {
        Commands::Migrate => {
            db.migrate().await.context("Failed to run migrations")?;
            info!("Migrations applied");
        }
        Commands::Seed => {
            let inserted = db.seed_default_catalog().await?;
            println!("{} categories inserted", inserted);
        }
        Commands::Resolve { items } => {
            let categorizer = build_categorizer(&db)?;
            for item in items {
                match categorizer.resolve_category_id(&item).await {
                    Some(id) => println!("{} -> {}", item, id),
                    None => println!("{} -> (none)", item),
                }
            }
        }
        Commands::Correct { item, category_id } => {
            let categorizer = build_categorizer(&db)?;
            if !categorizer.record_correction(&item, category_id).await {
                anyhow::bail!(
                    "Correction for '{}' was not stored (unknown category {} or store unavailable)",
                    item,
                    category_id
                );
            }
            println!("{} -> {}", item, category_id);
        }
    }

    Ok(())
}

fn build_categorizer(db: &Database) -> anyhow::Result<Categorizer> {
    let classifier = create_classifier(&ClassifierConfig::from_env()?)?;
    let config = CategorizerConfig::from_env()?;
    info!(
        classifier = classifier.name(),
        fallback = ?config.fallback_names,
        "Categorizer ready"
    );
    Ok(Categorizer::new(
        Arc::new(db.categories.clone()),
        Arc::new(db.cache.clone()),
        classifier,
    )
    .with_config(config))
}
