//! Record store access module
//!
//! Every backend exposes the same read-only contract, [`ShopOps`], over a single
//! collection of shop records. Which backend serves the process is decided once,
//! at startup, by building an [`AnyShopStore`].
//!
//! ## Key Components
//! - [`ShopOps`] - read operations used by the query service
//! - [`ShopOpsMut`] - upsert operations used only by the import tool and tests
//! - [`filter`] - predicates handed to [`ShopOps::find`] and [`ShopOps::count`]
//! - [`stats`] - grouped counts for stores without a native aggregation
//! - [`AnyShopStore`] - the backend selected by configuration

use async_trait::async_trait;

use crate::{
    config::{StoreBackend, StoreConfig},
    models::{shop::Shop, stats::GroupCounts},
};

pub mod error;
pub mod filter;
pub mod memory;
#[cfg(any(test, feature = "mocks"))]
pub mod mock;
pub mod postgres;
pub mod stats;

use error::StoreResult;
use filter::Filter;
pub use memory::InMemoryStore;
#[cfg(any(test, feature = "mocks"))]
pub use mock::{ErrorMode, MockStore};
pub use postgres::PostgresStore;

/// Read-only operations over the shop collection.
///
/// ## Implementation Notes
/// - A missing record is `Ok(None)` / an empty vector, never an error
/// - Any `Err` means the store could not answer; callers must not treat it as "no data"
/// - Result order is the store's insertion order
#[async_trait]
pub trait ShopOps: Send + Sync {
    /// Short name of the backend, reported by the banner and ping endpoints
    fn backend_name(&self) -> &'static str;

    /// Every record in the collection
    async fn list_all(&self) -> StoreResult<Vec<Shop>>;

    /// The record whose `id` is exactly `id`
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Shop>>;

    /// Records matching `filter`, at most `limit` of them when given
    async fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<Shop>>;

    /// Number of records matching `filter`, or the collection size without one
    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64>;

    /// Number of records per value of `field`, largest group first.
    ///
    /// Groups of equal size keep the order in which their value first appears in
    /// the collection. Records without the field share one group.
    async fn count_grouped_by(&self, field: &str) -> StoreResult<GroupCounts>;
}

/// What an upsert did to the stored collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Write operations, only used to load the collection.
///
/// The serving path only ever holds a `dyn ShopOps`.
#[async_trait]
pub trait ShopOpsMut: ShopOps {
    /// Insert `shop`, or merge it into the stored record with the same `id`
    async fn upsert(&self, shop: Shop) -> StoreResult<UpsertOutcome>;

    /// Remove every record, returning how many were removed
    async fn clear(&self) -> StoreResult<u64>;
}

/// The record store selected at startup
pub enum AnyShopStore {
    /// Flat JSON file loaded into memory
    File(InMemoryStore),

    /// PostgreSQL-backed document collection
    Postgres(PostgresStore),

    /// In-memory store with fault injection
    #[cfg(any(test, feature = "mocks"))]
    Mock(MockStore),
}

impl AnyShopStore {
    /// Build the store described by `config`, failing if it cannot be reached
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend {
            StoreBackend::File => Ok(Self::File(
                InMemoryStore::from_file(&config.data_file).await?,
            )),
            StoreBackend::Postgres => Ok(Self::Postgres(PostgresStore::connect(config).await?)),
            #[cfg(any(test, feature = "mocks"))]
            StoreBackend::Mock => Ok(Self::Mock(MockStore::with_sample_data()?)),
        }
    }
}

impl std::fmt::Debug for AnyShopStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnyShopStore::{}", self.backend_name())
    }
}

#[async_trait]
impl ShopOps for AnyShopStore {
    fn backend_name(&self) -> &'static str {
        match self {
            AnyShopStore::File(store) => store.backend_name(),
            AnyShopStore::Postgres(store) => store.backend_name(),
            #[cfg(any(test, feature = "mocks"))]
            AnyShopStore::Mock(store) => store.backend_name(),
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<Shop>> {
        match self {
            AnyShopStore::File(store) => store.list_all().await,
            AnyShopStore::Postgres(store) => store.list_all().await,
            #[cfg(any(test, feature = "mocks"))]
            AnyShopStore::Mock(store) => store.list_all().await,
        }
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Shop>> {
        match self {
            AnyShopStore::File(store) => store.get_by_id(id).await,
            AnyShopStore::Postgres(store) => store.get_by_id(id).await,
            #[cfg(any(test, feature = "mocks"))]
            AnyShopStore::Mock(store) => store.get_by_id(id).await,
        }
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<Shop>> {
        match self {
            AnyShopStore::File(store) => store.find(filter, limit).await,
            AnyShopStore::Postgres(store) => store.find(filter, limit).await,
            #[cfg(any(test, feature = "mocks"))]
            AnyShopStore::Mock(store) => store.find(filter, limit).await,
        }
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        match self {
            AnyShopStore::File(store) => store.count(filter).await,
            AnyShopStore::Postgres(store) => store.count(filter).await,
            #[cfg(any(test, feature = "mocks"))]
            AnyShopStore::Mock(store) => store.count(filter).await,
        }
    }

    async fn count_grouped_by(&self, field: &str) -> StoreResult<GroupCounts> {
        match self {
            AnyShopStore::File(store) => store.count_grouped_by(field).await,
            AnyShopStore::Postgres(store) => store.count_grouped_by(field).await,
            #[cfg(any(test, feature = "mocks"))]
            AnyShopStore::Mock(store) => store.count_grouped_by(field).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test::sample_shops;

    #[tokio::test]
    async fn connect_mock_backend() {
        let config = StoreConfig {
            backend: StoreBackend::Mock,
            ..StoreConfig::default()
        };

        let store = AnyShopStore::connect(&config).await.unwrap();
        assert_eq!(store.backend_name(), "mock");
        assert!(store.count(None).await.unwrap() > 0);
    }

    #[tokio::test]
    async fn connect_file_backend_with_missing_file_fails() {
        let config = StoreConfig {
            backend: StoreBackend::File,
            data_file: "/nonexistent/shops.json".into(),
            ..StoreConfig::default()
        };

        let err = AnyShopStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, error::StoreError::Io(_)));
    }

    #[tokio::test]
    async fn file_variant_delegates() {
        let store = AnyShopStore::File(InMemoryStore::from_shops(sample_shops()));

        assert_eq!(store.backend_name(), "file");
        assert_eq!(store.list_all().await.unwrap().len(), 4);
        assert!(store.get_by_id("a").await.unwrap().is_some());
        assert_eq!(
            store
                .find(&filter::category_filter("food"), None)
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(store.count_grouped_by("category").await.unwrap().get("food"), Some(2));
    }
}
