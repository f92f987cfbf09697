use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::error::Error;

/// Query parameters of the search endpoint
///
/// Parameters:
/// * `q`: the search text, required and not blank (checked by the service)
/// * `category`: optional exact category, empty means none
/// * `limit`: maximum number of results, a positive integer
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

impl<S> FromRequestParts<S> for SearchQuery
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<SearchQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                Error::BadRequest(format!("Invalid query parameters: {}", rejection.body_text()))
            })?;

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(uri: &str) -> Result<SearchQuery, Error> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        SearchQuery::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn parses_all_parameters() {
        let query = extract("/api/search?q=thai%20food&category=food&limit=5")
            .await
            .unwrap();

        assert_eq!(query.q.as_deref(), Some("thai food"));
        assert_eq!(query.category.as_deref(), Some("food"));
        assert_eq!(query.limit, Some(5));
    }

    #[tokio::test]
    async fn everything_is_optional_at_this_layer() {
        let query = extract("/api/search").await.unwrap();

        assert!(query.q.is_none());
        assert!(query.limit.is_none());
    }

    #[tokio::test]
    async fn malformed_limit_is_a_bad_request() {
        let err = extract("/api/search?q=x&limit=ten").await.unwrap_err();

        assert!(matches!(err, Error::BadRequest(msg) if msg.starts_with("Invalid query parameters")));
    }
}
