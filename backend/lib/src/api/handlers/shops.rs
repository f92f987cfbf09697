//! This module contains the handlers for the shop directory endpoints

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::{api::validation::SearchQuery, error::Error, services::Services};

pub async fn list_shops(State(services): State<Services>) -> Result<impl IntoResponse, Error> {
    let response = services.shops.list_shops().await?;
    Ok(Json(response))
}

pub async fn get_shop(
    State(services): State<Services>,
    Path(shop_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let response = services.shops.get_shop(&shop_id).await?;
    Ok(Json(response))
}

pub async fn list_by_category(
    State(services): State<Services>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let response = services.shops.list_by_category(&category).await?;
    Ok(Json(response))
}

pub async fn search(
    State(services): State<Services>,
    query: SearchQuery,
) -> Result<impl IntoResponse, Error> {
    let response = services
        .shops
        .search_shops(
            query.q.as_deref().unwrap_or_default(),
            query.category.as_deref(),
            query.limit,
        )
        .await?;

    Ok(Json(response))
}

pub async fn stats(State(services): State<Services>) -> Result<impl IntoResponse, Error> {
    let response = services.shops.get_stats().await?;
    Ok(Json(response))
}
