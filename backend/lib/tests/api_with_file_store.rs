//! Integration tests serving a flat-file collection through the full HTTP stack

mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use shop_directory_lib::{
        api::create_app,
        config::{StoreBackend, StoreConfig},
        data::store::{AnyShopStore, ShopOps},
        services::Services,
    };

    const SHOPS_JSON: &str = r#"[
        {"_id": "6500aa", "id": "a", "category": "food", "type": "restaurant",
         "name": "Noodle House", "tags": ["chinese", "cheap"], "opening_hours": "11-22"},
        {"_id": "6500bb", "id": "b", "category": "housing", "type": "apartment",
         "name": "City Flats", "tags": ["student"]},
        {"id": "c", "category": "food", "name": "Pop-up Stall",
         "services": ["Late night CHINESE takeaway"]},
        {"id": "a", "description": "Hand-pulled noodles"}
    ]"#;

    /// Write the fixture to a temp file and serve it through the `file` backend
    async fn file_server(name: &str) -> TestServer {
        let path = std::env::temp_dir().join(format!("{name}-{}.json", std::process::id()));
        tokio::fs::write(&path, SHOPS_JSON).await.unwrap();

        let config = StoreConfig {
            backend: StoreBackend::File,
            data_file: path.clone(),
            ..StoreConfig::default()
        };
        let store = AnyShopStore::connect(&config).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        let store: Arc<dyn ShopOps> = Arc::new(store);
        let app = create_app(Services::new(store), &["*".to_string()]);
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn duplicate_ids_are_folded_and_internal_ids_stripped() {
        let server = file_server("folded").await;

        let shops: Vec<Value> = server.get("/api/shops").await.json();
        assert_eq!(shops.len(), 3);
        assert!(shops.iter().all(|s| s.get("_id").is_none()));

        let noodle: Value = server.get("/api/shops/a").await.json();
        assert_eq!(noodle["name"], "Noodle House");
        assert_eq!(noodle["description"], "Hand-pulled noodles");
        assert_eq!(noodle["opening_hours"], "11-22");
    }

    #[tokio::test]
    async fn search_and_stats_over_the_file() {
        let server = file_server("search").await;

        let response = server
            .get("/api/search")
            .add_query_param("q", "chinese")
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let json: Value = response.json();
        assert_eq!(json["count"], 2);
        assert_eq!(json["results"][0]["id"], "a");
        assert_eq!(json["results"][1]["id"], "c");

        let stats: Value = server.get("/api/stats").await.json();
        assert_eq!(stats["total"], 3);
        assert_eq!(stats["by_category"], json!({"food": 2, "housing": 1}));
        assert_eq!(
            stats["by_type"],
            json!({"restaurant": 1, "apartment": 1, "null": 1})
        );

        let banner: Value = server.get("/").await.json();
        assert_eq!(banner["database"], "file");
        assert_eq!(banner["shops_count"], 3);
    }
}
