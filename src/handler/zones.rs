use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{db::zonedb::ZoneExt, error::HttpError, AppState};

pub fn zone_handler() -> Router {
    Router::new().route("/", get(list_zones))
}

pub async fn list_zones(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let zones = app_state
        .db_client
        .get_zones()
        .await
        .map_err(HttpError::from)?;

    Ok(Json(zones))
}
