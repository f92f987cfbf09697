//! In-memory record store
//!
//! Serves the flat-file backend: the JSON file is read once into memory and
//! every query runs against that snapshot. Thread-safe, and writable through
//! [`ShopOpsMut`] so the import path can be exercised without a database.

use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{
    error::{StoreError, StoreResult},
    filter::Filter,
    stats::group_counts,
    ShopOps, ShopOpsMut, UpsertOutcome,
};
use crate::models::{shop::Shop, stats::GroupCounts};

/// Records in insertion order plus an index from `id` to position
#[derive(Debug, Default)]
struct Collection {
    shops: Vec<Shop>,
    positions: HashMap<String, usize>,
}

impl Collection {
    fn upsert(&mut self, shop: Shop) -> UpsertOutcome {
        match self.positions.get(&shop.id) {
            Some(&position) => {
                let stored = &mut self.shops[position];
                let before = stored.clone();
                stored.merge(shop);

                if *stored == before {
                    UpsertOutcome::Unchanged
                } else {
                    UpsertOutcome::Updated
                }
            }
            None => {
                self.positions.insert(shop.id.clone(), self.shops.len());
                self.shops.push(shop);
                UpsertOutcome::Inserted
            }
        }
    }
}

/// In-memory store using Arc<RwLock<..>>
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collection: Arc<RwLock<Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, folding duplicate ids with upsert semantics
    pub fn from_shops(shops: impl IntoIterator<Item = Shop>) -> Self {
        let mut collection = Collection::default();
        for shop in shops {
            if collection.upsert(shop) != UpsertOutcome::Inserted {
                warn!("Duplicate shop id in source data, later fields take precedence");
            }
        }

        Self {
            collection: Arc::new(RwLock::new(collection)),
        }
    }

    /// Parse a JSON array of shop records
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let shops: Vec<Shop> = serde_json::from_str(json)?;
        Ok(Self::from_shops(shops))
    }

    /// Load the flat-file collection at `path`
    pub async fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;

        let store = Self::from_json_str(&contents).map_err(|e| match e {
            StoreError::Decode(msg) => StoreError::decode(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        debug!(path = %path.display(), "Loaded shops from flat file");
        Ok(store)
    }
}

#[async_trait]
impl ShopOps for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn list_all(&self) -> StoreResult<Vec<Shop>> {
        Ok(self.collection.read().await.shops.clone())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Shop>> {
        let collection = self.collection.read().await;

        Ok(collection
            .positions
            .get(id)
            .map(|&position| collection.shops[position].clone()))
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<Shop>> {
        let collection = self.collection.read().await;

        Ok(collection
            .shops
            .iter()
            .filter(|shop| filter.matches(shop))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        let collection = self.collection.read().await;

        let count = match filter {
            Some(filter) => collection.shops.iter().filter(|s| filter.matches(s)).count(),
            None => collection.shops.len(),
        };
        Ok(count as u64)
    }

    async fn count_grouped_by(&self, field: &str) -> StoreResult<GroupCounts> {
        let collection = self.collection.read().await;
        Ok(group_counts(&collection.shops, field))
    }
}

#[async_trait]
impl ShopOpsMut for InMemoryStore {
    async fn upsert(&self, shop: Shop) -> StoreResult<UpsertOutcome> {
        Ok(self.collection.write().await.upsert(shop))
    }

    async fn clear(&self) -> StoreResult<u64> {
        let mut collection = self.collection.write().await;
        let removed = collection.shops.len() as u64;
        *collection = Collection::default();
        Ok(removed)
    }
}
