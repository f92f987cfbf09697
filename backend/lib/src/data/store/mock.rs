//! Mock record store for testing
//!
//! Wraps an [`InMemoryStore`] and can be configured to fail, so callers can
//! verify how store outages propagate.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, RwLock},
    time::sleep,
};

use super::{
    error::{StoreError, StoreResult},
    filter::Filter,
    memory::InMemoryStore,
    ShopOps, ShopOpsMut, UpsertOutcome,
};
use crate::{
    constants::mocks::{SAMPLE_SHOPS_JSON, TIMEOUT_MULTIPLIER},
    models::{shop::Shop, stats::GroupCounts},
};

/// Error simulation modes for testing
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorMode {
    /// No errors - all calls succeed
    None,
    /// Every call fails as if the store were down
    Unavailable(String),
    /// Every call times out
    Timeout,
    /// Fail after N successful calls
    FailAfterNCalls(usize),
}

/// Mock record store
#[derive(Clone)]
pub struct MockStore {
    inner: InMemoryStore,
    error_mode: Arc<RwLock<ErrorMode>>,
    /// Call counter for FailAfterNCalls mode
    call_count: Arc<Mutex<usize>>,
    /// Optional delay to simulate network latency
    latency_ms: Arc<RwLock<Option<u64>>>,
}

impl MockStore {
    /// Create a mock store serving `shops`, with no faults configured
    pub fn new(shops: impl IntoIterator<Item = Shop>) -> Self {
        Self {
            inner: InMemoryStore::from_shops(shops),
            error_mode: Arc::new(RwLock::new(ErrorMode::None)),
            call_count: Arc::new(Mutex::new(0)),
            latency_ms: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a mock store holding the built-in sample shops
    pub fn with_sample_data() -> StoreResult<Self> {
        let shops: Vec<Shop> = serde_json::from_str(SAMPLE_SHOPS_JSON)?;
        Ok(Self::new(shops))
    }

    /// Set the error simulation mode
    pub async fn set_error_mode(&self, mode: ErrorMode) {
        *self.error_mode.write().await = mode;

        // Reset call count when changing error mode
        *self.call_count.lock().await = 0;
    }

    /// Set network latency simulation
    pub async fn set_latency_ms(&self, latency: u64) {
        *self.latency_ms.write().await = Some(latency);
    }

    /// Check if we should simulate an error based on current mode
    async fn check_error(&self) -> StoreResult<()> {
        let current_count = {
            let mut call_count = self.call_count.lock().await;
            *call_count += 1;
            *call_count
        };

        let latency = *self.latency_ms.read().await;
        let error_mode = self.error_mode.read().await.clone();

        match error_mode {
            ErrorMode::None => {
                if let Some(latency_ms) = latency {
                    sleep(Duration::from_millis(latency_ms)).await;
                }
                Ok(())
            }
            ErrorMode::Unavailable(msg) => Err(StoreError::Unavailable(msg)),
            ErrorMode::Timeout => {
                let latency_ms = latency.unwrap_or(0);
                sleep(Duration::from_millis(latency_ms * TIMEOUT_MULTIPLIER)).await;
                Err(StoreError::Timeout(latency_ms * TIMEOUT_MULTIPLIER / 1000))
            }
            ErrorMode::FailAfterNCalls(n) => {
                if current_count > n {
                    Err(StoreError::Unavailable(
                        "Simulated failure after N calls".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[async_trait]
impl ShopOps for MockStore {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn list_all(&self) -> StoreResult<Vec<Shop>> {
        self.check_error().await?;
        self.inner.list_all().await
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Shop>> {
        self.check_error().await?;
        self.inner.get_by_id(id).await
    }

    async fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<Shop>> {
        self.check_error().await?;
        self.inner.find(filter, limit).await
    }

    async fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        self.check_error().await?;
        self.inner.count(filter).await
    }

    async fn count_grouped_by(&self, field: &str) -> StoreResult<GroupCounts> {
        self.check_error().await?;
        self.inner.count_grouped_by(field).await
    }
}

#[async_trait]
impl ShopOpsMut for MockStore {
    async fn upsert(&self, shop: Shop) -> StoreResult<UpsertOutcome> {
        self.check_error().await?;
        self.inner.upsert(shop).await
    }

    async fn clear(&self) -> StoreResult<u64> {
        self.check_error().await?;
        self.inner.clear().await
    }
}
