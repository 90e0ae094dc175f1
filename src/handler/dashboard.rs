use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};
use chrono::Utc;

use crate::{error::HttpError, middleware::JWTAuthMiddeware, AppState};

pub const CHARTS_COMPONENT: &str = "Charts";
pub const SETTINGS_COMPONENT: &str = "Settings";

pub fn dashboard_handler() -> Router {
    Router::new().route("/", get(get_dashboard))
}

pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let props = app_state
        .dashboard_service
        .owner_dashboard(&user.user, Utc::now().date_naive(), CHARTS_COMPONENT)
        .await?;

    Ok(Json(props))
}
