use axum::{extract::State, response::IntoResponse, Json};

use crate::{error::Error, services::Services};

pub mod shops;

// ==================== Service Handlers ====================

pub async fn root(State(services): State<Services>) -> impl IntoResponse {
    Json(services.shops.banner().await)
}

pub async fn ping(State(services): State<Services>) -> Result<impl IntoResponse, Error> {
    let response = services.shops.ping().await?;
    Ok(Json(response))
}
