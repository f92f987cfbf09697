//! One-shot import of a flat-file collection into a writable store.
//!
//! Records are upserted by `id`, so running the same import twice leaves the
//! store as the first run left it.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    data::store::{
        error::{StoreError, StoreResult},
        ShopOpsMut, UpsertOutcome,
    },
    models::shop::Shop,
};

/// What an import did to the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Records removed before importing
    pub removed: u64,
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
    /// Collection size once the import finished
    pub total: u64,
}

/// Parse a JSON array of shop records.
///
/// Every record must carry a string `id`; the first one that does not fails
/// the whole parse, so nothing is written for a partially valid file.
pub fn parse_shops(json: &str) -> StoreResult<Vec<Shop>> {
    let records: Vec<Value> = serde_json::from_str(json)?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.get("id").is_some_and(Value::is_string) {
                return Err(StoreError::invalid_input(format!(
                    "record {index} has no string id"
                )));
            }
            serde_json::from_value(record)
                .map_err(|e| StoreError::decode(format!("record {index}: {e}")))
        })
        .collect()
}

/// Upsert `shops` into `store` keyed by `id`, optionally clearing it first
pub async fn import_shops<S>(store: &S, shops: Vec<Shop>, truncate: bool) -> StoreResult<ImportSummary>
where
    S: ShopOpsMut + ?Sized,
{
    let mut summary = ImportSummary::default();

    if truncate {
        summary.removed = store.clear().await?;
        info!(removed = summary.removed, "Cleared existing shops");
    }

    for shop in shops {
        let id = shop.id.clone();
        match store.upsert(shop).await? {
            UpsertOutcome::Inserted => summary.inserted += 1,
            UpsertOutcome::Updated => summary.updated += 1,
            UpsertOutcome::Unchanged => summary.unchanged += 1,
        }
        debug!(id = %id, "Imported shop");
    }

    summary.total = store.count(None).await?;
    info!(
        inserted = summary.inserted,
        updated = summary.updated,
        unchanged = summary.unchanged,
        total = summary.total,
        "Import finished"
    );

    Ok(summary)
}
