//! Route definitions for the shop directory API

use axum::{routing::get, Router};

use super::handlers;
use crate::services::Services;

/// Creates the router with all API routes
pub fn routes(services: Services) -> Router {
    Router::new()
        // Banner and liveness
        .route("/", get(handlers::root))
        .route("/ping", get(handlers::ping))
        // Shop endpoints
        .route("/api/shops", get(handlers::shops::list_shops))
        .route("/api/shops/{shop_id}", get(handlers::shops::get_shop))
        .route(
            "/api/shops/category/{category}",
            get(handlers::shops::list_by_category),
        )
        .route("/api/search", get(handlers::shops::search))
        .route("/api/stats", get(handlers::shops::stats))
        // Add state to all routes
        .with_state(services)
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{
        api::mock_app,
        constants::test::{categories, ids},
        data::store::{ErrorMode, MockStore},
        services::Services,
    };

    fn server() -> TestServer {
        TestServer::new(mock_app()).unwrap()
    }

    /// Server whose store fails every call
    async fn failing_server() -> TestServer {
        let store = MockStore::with_sample_data().unwrap();
        store
            .set_error_mode(ErrorMode::Unavailable("connection refused".to_string()))
            .await;
        let app = crate::api::create_app(Services::with_mock_store(store), &["*".to_string()]);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn banner_reports_backend_and_count() {
        let response = server().get("/").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["message"], "Leeds Student Directory API");
        assert_eq!(json["database"], "mock");
        assert_eq!(json["shops_count"], 3);
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn banner_survives_store_outage() {
        let response = failing_server().await.get("/").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["database"], "unavailable");
        assert!(json.get("shops_count").is_none());
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let response = server().get("/ping").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>(),
            json!({"message": "pong", "shops_count": 3, "database": "mock"})
        );
    }

    #[tokio::test]
    async fn list_shops_returns_every_record() {
        let response = server().get("/api/shops").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let shops: Vec<Value> = response.json();
        let ids: Vec<&str> = shops.iter().map(|s| s["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn get_shop_by_id() {
        let response = server().get(&format!("/api/shops/{}", ids::CITY_FLATS)).await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["name"], "City Flats");
        assert_eq!(json["type"], "apartment");
    }

    #[tokio::test]
    async fn unknown_shop_is_404_with_id() {
        let response = server().get(&format!("/api/shops/{}", ids::MISSING)).await;

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let json: Value = response.json();
        assert_eq!(json["id"], ids::MISSING);
        assert!(json["error"].as_str().unwrap().contains(ids::MISSING));
    }

    #[tokio::test]
    async fn category_route_filters() {
        let response = server()
            .get(&format!("/api/shops/category/{}", categories::FOOD))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let shops: Vec<Value> = response.json();
        assert_eq!(shops.len(), 2);
        assert!(shops.iter().all(|s| s["category"] == categories::FOOD));
    }

    #[tokio::test]
    async fn unknown_category_is_an_empty_list() {
        let response = server()
            .get(&format!("/api/shops/category/{}", categories::UNKNOWN))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>(), json!([]));
    }

    #[tokio::test]
    async fn search_with_category_and_limit() {
        let response = server()
            .get("/api/search")
            .add_query_param("q", "a")
            .add_query_param("category", categories::FOOD)
            .add_query_param("limit", 1)
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["query"], "a");
        assert_eq!(json["category"], categories::FOOD);
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0]["id"], ids::NOODLE_HOUSE);
    }

    #[tokio::test]
    async fn search_without_category_reports_null() {
        let response = server().get("/api/search").add_query_param("q", "noodle").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["category"], Value::Null);
        assert_eq!(json["count"], 1);
    }

    #[tokio::test]
    async fn search_rejects_blank_or_missing_query() {
        let server = server();

        for request in [
            server.get("/api/search").add_query_param("q", "   "),
            server.get("/api/search").add_query_param("q", ""),
            server.get("/api/search"),
        ] {
            let response = request.await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            assert!(response.json::<Value>()["error"].is_string());
        }
    }

    #[tokio::test]
    async fn search_rejects_bad_limits() {
        let server = server();

        for limit in ["0", "-1", "many"] {
            let response = server
                .get("/api/search")
                .add_query_param("q", "noodle")
                .add_query_param("limit", limit)
                .await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "limit={limit}");
        }
    }

    #[tokio::test]
    async fn stats_sum_to_total() {
        let response = server().get("/api/stats").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["total"], 3);
        assert_eq!(json["by_category"], json!({"food": 2, "housing": 1}));
        assert_eq!(
            json["by_type"],
            json!({"restaurant": 1, "apartment": 1, "supermarket": 1})
        );
    }

    #[tokio::test]
    async fn store_outage_is_503() {
        let server = failing_server().await;

        for path in [
            "/ping",
            "/api/shops",
            "/api/shops/a",
            "/api/shops/category/food",
            "/api/search?q=noodle",
            "/api/stats",
        ] {
            let response = server.get(path).await;
            assert_eq!(
                response.status_code(),
                StatusCode::SERVICE_UNAVAILABLE,
                "{path}"
            );
            // the store's own error text never reaches the client
            let json: Value = response.json();
            assert_eq!(json["error"], "Store unavailable");
        }
    }
}
