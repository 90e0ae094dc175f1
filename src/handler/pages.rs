use std::sync::Arc;

use axum::{
    extract::OriginalUri,
    middleware,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    dtos::pagedtos::PageDto,
    error::HttpError,
    handler::dashboard::{CHARTS_COMPONENT, SETTINGS_COMPONENT},
    middleware::{auth, role_check, JWTAuthMiddeware},
    models::usermodel::UserRole::{self, Admin, Owner, Tenant},
    AppState,
};

/// Page component without props.
fn page(component: &'static str) -> MethodRouter {
    get(move |OriginalUri(uri): OriginalUri| async move {
        Json(PageDto::new(component, json!({}), uri.path()))
    })
}

/// Page component that receives the signed-in user as its only prop.
fn user_page(component: &'static str) -> MethodRouter {
    get(
        move |OriginalUri(uri): OriginalUri, Extension(user): Extension<JWTAuthMiddeware>| async move {
            Json(PageDto::new(component, json!({ "user": user.user }), uri.path()))
        },
    )
}

fn dashboard_page(child_component: &'static str) -> MethodRouter {
    get(
        move |OriginalUri(uri): OriginalUri,
              Extension(app_state): Extension<Arc<AppState>>,
              Extension(user): Extension<JWTAuthMiddeware>| async move {
            let props = app_state
                .dashboard_service
                .owner_dashboard(&user.user, Utc::now().date_naive(), child_component)
                .await
                .map_err(HttpError::from)?;

            let props = serde_json::to_value(props).map_err(|e| HttpError::server_error(e.to_string()))?;
            Ok::<_, HttpError>(Json(PageDto::new("Dashboard", props, uri.path())).into_response())
        },
    )
}

fn gated(route: MethodRouter, roles: Vec<UserRole>) -> MethodRouter {
    route
        .layer(middleware::from_fn(move |state, req, next| {
            role_check(state, req, next, roles.clone())
        }))
        .layer(middleware::from_fn(auth))
}

pub fn page_handler() -> Router {
    Router::new()
        .route("/", page("Welcome"))
        .route("/properties", page("Properties"))
        .route("/dashboard", gated(dashboard_page(CHARTS_COMPONENT), vec![Owner]))
        .route("/dashboard/settings", gated(dashboard_page(SETTINGS_COMPONENT), vec![Owner]))
        .route("/my-properties", gated(user_page("MyProperties"), vec![Admin, Owner]))
        .route("/search-properties", gated(page("SearchProperties"), vec![Tenant]))
        .route("/contracts", gated(page("Contracts/showContract"), vec![Admin, Owner]))
        .route("/manage/contracts", gated(page("Contracts/manageContracts"), vec![Admin, Owner]))
        .route("/contracts-details/:id", gated(page("Contracts/detailsContract"), vec![Admin, Owner]))
        .route("/all-contracts", gated(page("Contracts/allContract"), vec![Admin, Owner]))
        .route("/TrackRequest", gated(page("TrackRequest"), vec![Tenant]))
        .route("/EvaluateRequest", gated(page("EvaluateRequest"), vec![Admin, Owner]))
        .route("/appointments", gated(user_page("Appointments"), vec![Admin, Tenant]))
        .route("/appointment-request", gated(user_page("AppointmentRequest"), vec![Admin, Owner]))
        .route("/maintenance", gated(page("Maintenance/ShowMaintenance"), vec![Admin, Tenant]))
        .route("/maintenanceOwner", gated(page("Maintenance/ShowMaintenanceJobs"), vec![Admin, Owner]))
        .route("/my-invoices", gated(page("invoice/MyInvoices"), vec![Admin, Owner]))
}
