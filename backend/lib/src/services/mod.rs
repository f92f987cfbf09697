//! Services module for the shop directory backend

pub mod shops;

use std::sync::Arc;

use crate::data::store::ShopOps;

#[derive(Clone)]
pub struct Services {
    pub shops: Arc<shops::ShopService>,
}

impl Services {
    /// Create the services over an already connected store
    pub fn new(store: Arc<dyn ShopOps>) -> Self {
        let shops = Arc::new(shops::ShopService::new(store));
        Self { shops }
    }
}

#[cfg(any(test, feature = "mocks"))]
impl Services {
    /// Services backed by a [`MockStore`](crate::data::store::MockStore) holding the sample shops
    pub fn mocks() -> Self {
        let store = crate::data::store::MockStore::with_sample_data()
            .expect("built-in sample shops to be valid JSON");
        Self::with_mock_store(store)
    }

    /// Services backed by `store`, so tests can keep a handle for fault injection
    pub fn with_mock_store(store: crate::data::store::MockStore) -> Self {
        Self::new(Arc::new(store))
    }
}
