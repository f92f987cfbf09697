//! Configuration constants for the shop directory backend


/// Default server configuration
pub mod server {
    /// Default HTTP listening host
    pub const DEFAULT_HOST: &str = "0.0.0.0";

    /// Default HTTP server port
    pub const DEFAULT_PORT: u16 = 8000;

    /// Origin value that allows any host
    pub const ANY_ORIGIN: &str = "*";

    /// Service name reported in logs
    pub const SERVICE_NAME: &str = "shop-directory-backend";

    /// Banner message returned by the root endpoint
    pub const BANNER_MESSAGE: &str = "Leeds Student Directory API";
}

/// Record store configuration
pub mod store {
    /// Default flat-file location
    pub const DEFAULT_DATA_FILE: &str = "data/shops.json";

    /// Default PostgreSQL database URL
    pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/shop_directory";

    /// Default collection (table) holding the shop documents
    pub const DEFAULT_COLLECTION: &str = "shops";

    /// Default timeout applied to every store call, in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Default maximum database connections
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 16;

    /// Field holding a storage-internal identifier, stripped from every response
    pub const INTERNAL_ID_FIELD: &str = "_id";

    /// Group key used for records where the grouped field is missing or null
    pub const UNSET_GROUP_KEY: &str = "null";
}

/// API configuration constants
pub mod api {
    /// Default number of search results
    pub const DEFAULT_SEARCH_LIMIT: usize = 50;
}

#[cfg(any(test, feature = "mocks"))]
pub mod mocks {
    /// Simulated latency multiplier applied when a mock store times out
    pub const TIMEOUT_MULTIPLIER: u64 = 10;

    /// Sample records served by the mock backend
    pub const SAMPLE_SHOPS_JSON: &str = r#"[
        {
            "id": "a",
            "name": "Noodle House",
            "category": "food",
            "type": "restaurant",
            "tags": ["chinese", "cheap"],
            "services": ["dine-in", "takeaway"],
            "description": "Hand-pulled noodles near campus"
        },
        {
            "id": "b",
            "name": "City Flats",
            "category": "housing",
            "type": "apartment",
            "tags": ["student"],
            "services": ["bills included"],
            "description": "Furnished studios in the city centre"
        },
        {
            "id": "c",
            "name": "Oriental Mart",
            "category": "food",
            "type": "supermarket",
            "tags": ["asian", "groceries"],
            "services": ["delivery"],
            "description": "Asian groceries and snacks"
        }
    ]"#;
}
