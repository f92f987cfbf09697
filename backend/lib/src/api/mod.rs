//! API module for the shop directory backend

pub mod handlers;
pub mod routes;
pub mod validation;

use axum::{
    http::{header::ACCEPT, header::CONTENT_TYPE, Method},
    Router,
};
use http::HeaderValue;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{constants::server::ANY_ORIGIN, services::Services};

/// Creates the axum application with all routes and middleware
pub fn create_app(services: Services, cors_origins: &[String]) -> Router {
    routes::routes(services)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Read-only CORS policy for the given origins; `*` anywhere allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == ANY_ORIGIN) {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .allow_credentials(false)
}

#[cfg(all(test, feature = "mocks"))]
/// Create a test application
///
/// This function creates a test application with mock services.
pub fn mock_app() -> Router {
    create_app(Services::mocks(), &[ANY_ORIGIN.to_string()])
}
