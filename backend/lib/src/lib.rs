//! Leeds Student Directory backend library

pub mod api;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod import;
pub mod log;
pub mod models;
pub mod services;

pub use api::create_app;
pub use config::Config;
pub use error::{Error, Result};

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use super::*;

    /// Creates a test application with mocked services
    ///
    /// This function serves as utility for other tests
    fn create_test_app() -> axum::Router {
        // Create test services with everything mocked
        let services = services::Services::mocks();

        api::create_app(services, &Config::default().cors_origins)
    }

    #[tokio::test]
    async fn test_ping_endpoint() {
        // Create test server
        let app = create_test_app();
        let server = TestServer::new(app).unwrap();

        // Test ping endpoint
        let response = server.get("/ping").await;

        // Assert status code
        assert_eq!(response.status_code(), StatusCode::OK);

        // Assert response body
        let json: serde_json::Value = response.json();
        assert_eq!(json["message"], "pong");
        assert_eq!(json["database"], "mock");
    }
}
