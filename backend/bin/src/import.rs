//! Shop import tool
//!
//! Loads the flat-file collection into the PostgreSQL document store, keyed by
//! shop `id`. Safe to re-run: unchanged records are left alone.

use anyhow::{Context, Result};
use clap::Parser;
use shop_directory_lib::{
    config::{LogFormat, StoreBackend, StoreConfig},
    constants::store::{DEFAULT_COLLECTION, DEFAULT_DATABASE_URL, DEFAULT_DATA_FILE},
    data::store::{filter::Filter, PostgresStore, ShopOps},
    import::{import_shops, parse_shops},
    log::initialize_logging,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "shop-import")]
#[command(about = "Import shops from a JSON file into the document store", long_about = None)]
struct Args {
    /// JSON file holding an array of shop records
    #[arg(long, env = "SHOPS_FILE", default_value = DEFAULT_DATA_FILE)]
    file: String,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Collection (table) name
    #[arg(long, env = "SHOPS_COLLECTION", default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// Remove every stored shop before importing
    #[arg(long)]
    truncate: bool,

    /// Log output format (auto, json, text)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_format);

    let contents = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file))?;
    let shops = parse_shops(&contents).with_context(|| format!("Invalid shop data in {}", args.file))?;
    info!(file = %args.file, records = shops.len(), "Loaded shops");

    let config = StoreConfig {
        backend: StoreBackend::Postgres,
        database_url: args.database_url,
        collection: args.collection,
        ..StoreConfig::default()
    };
    config.validate().context("Invalid store configuration")?;

    let store = PostgresStore::connect(&config)
        .await
        .context("Failed to connect to the document store")?;
    store
        .ensure_schema()
        .await
        .context("Failed to prepare the collection table")?;

    let summary = import_shops(&store, shops, args.truncate)
        .await
        .context("Import failed")?;

    println!("Imported into '{}':", config.collection);
    println!("  removed:   {}", summary.removed);
    println!("  inserted:  {}", summary.inserted);
    println!("  updated:   {}", summary.updated);
    println!("  unchanged: {}", summary.unchanged);
    println!("  total:     {}", summary.total);

    let sample = store
        .find(&Filter::All, Some(1))
        .await
        .context("Failed to read back the collection")?
        .into_iter()
        .next()
        .map(|shop| shop.without_internal_fields());
    if let Some(shop) = sample {
        println!(
            "Sample record:\n{}",
            serde_json::to_string_pretty(&shop).context("Failed to render sample record")?
        );
    }

    Ok(())
}
