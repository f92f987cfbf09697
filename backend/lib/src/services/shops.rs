//! Shop query service
//!
//! The read-only use cases of the directory, implemented purely against a
//! [`ShopOps`] store. This is where store failures are classified and where
//! records are shaped before they leave the service.

use std::sync::Arc;

use tracing::{error, warn};

use crate::{
    constants::{api::DEFAULT_SEARCH_LIMIT, server::BANNER_MESSAGE},
    data::store::{
        error::StoreError,
        filter::{category_filter, text_search_filter},
        ShopOps,
    },
    error::Error,
    models::{BannerResponse, PingResponse, SearchResponse, Shop, StatsResponse},
};

/// Backend name reported by the banner when the store does not answer
const UNAVAILABLE_DATABASE: &str = "unavailable";

/// Service answering the directory's read operations
#[derive(Clone)]
pub struct ShopService {
    store: Arc<dyn ShopOps>,
}

impl ShopService {
    pub fn new(store: Arc<dyn ShopOps>) -> Self {
        Self { store }
    }

    /// Every shop in the collection
    pub async fn list_shops(&self) -> Result<Vec<Shop>, Error> {
        let shops = self.store.list_all().await.map_err(store_unavailable)?;
        Ok(shape(shops))
    }

    /// The shop with the given `id`
    pub async fn get_shop(&self, id: &str) -> Result<Shop, Error> {
        self.store
            .get_by_id(id)
            .await
            .map_err(store_unavailable)?
            .map(Shop::without_internal_fields)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Shops whose category is exactly `category`; unknown categories give an empty list
    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Shop>, Error> {
        let shops = self
            .store
            .find(&category_filter(category), None)
            .await
            .map_err(store_unavailable)?;
        Ok(shape(shops))
    }

    /// Keyword search over name, tags, services, type and description.
    ///
    /// An empty `category` counts as no category. `limit` defaults to
    /// [`DEFAULT_SEARCH_LIMIT`] and must be positive. The reported `count` is
    /// the number of returned results, not the number of matches.
    pub async fn search_shops(
        &self,
        query: &str,
        category: Option<&str>,
        limit: Option<usize>,
    ) -> Result<SearchResponse, Error> {
        let category = category.filter(|c| !c.is_empty());
        let limit = match limit {
            Some(0) => {
                return Err(Error::BadRequest(
                    "limit must be a positive integer".to_string(),
                ))
            }
            Some(limit) => limit,
            None => DEFAULT_SEARCH_LIMIT,
        };

        let filter =
            text_search_filter(query, category).map_err(|e| Error::BadRequest(e.to_string()))?;

        let results = shape(
            self.store
                .find(&filter, Some(limit))
                .await
                .map_err(store_unavailable)?,
        );

        Ok(SearchResponse {
            query: query.to_string(),
            category: category.map(str::to_string),
            count: results.len(),
            results,
        })
    }

    /// Collection size plus shop counts per category and per type
    pub async fn get_stats(&self) -> Result<StatsResponse, Error> {
        let total = self.store.count(None).await.map_err(store_unavailable)?;
        let by_category = self
            .store
            .count_grouped_by("category")
            .await
            .map_err(store_unavailable)?;
        let by_type = self
            .store
            .count_grouped_by("type")
            .await
            .map_err(store_unavailable)?;

        Ok(StatsResponse {
            total,
            by_category,
            by_type,
        })
    }

    /// Service banner; still answers when the store is down, without a count
    pub async fn banner(&self) -> BannerResponse {
        let (database, shops_count) = match self.store.count(None).await {
            Ok(count) => (self.store.backend_name(), Some(count)),
            Err(e) => {
                warn!(error = %e, "Store unavailable while building banner");
                (UNAVAILABLE_DATABASE, None)
            }
        };

        BannerResponse {
            message: BANNER_MESSAGE.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            shops_count,
        }
    }

    /// Liveness probe that requires the store to answer
    pub async fn ping(&self) -> Result<PingResponse, Error> {
        let shops_count = self.store.count(None).await.map_err(store_unavailable)?;

        Ok(PingResponse {
            message: "pong".to_string(),
            shops_count,
            database: self.store.backend_name().to_string(),
        })
    }
}

fn shape(shops: Vec<Shop>) -> Vec<Shop> {
    shops
        .into_iter()
        .map(Shop::without_internal_fields)
        .collect()
}

/// Log the store failure and hide its detail from the caller
fn store_unavailable(err: StoreError) -> Error {
    error!(error = %err, timeout = err.is_timeout(), "Store call failed");
    Error::StoreUnavailable
}
