use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::{contractdb::ContractExt, maintenancedb::MaintenanceExt, propertydb::PropertyExt},
    dtos::maintenancedtos::{CreateMaintenanceDto, UpdateMaintenanceDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{maintenancemodel::MaintenancePriority, usermodel::UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn maintenance_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(list_requests).merge(post(create_request).layer(middleware::from_fn(
                |state, req, next| role_check(state, req, next, vec![UserRole::Tenant, UserRole::Admin]),
            ))),
        )
        .route(
            "/:id",
            patch(update_request).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
}

pub async fn list_requests(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let requests = match user.user.role {
        UserRole::Tenant => app_state.db_client.get_requests_for_tenant(user.user.id).await,
        UserRole::Owner => app_state.db_client.get_requests_for_owner(Some(user.user.id)).await,
        UserRole::Admin => app_state.db_client.get_requests_for_owner(None).await,
    }
    .map_err(HttpError::from)?;

    Ok(Json(requests))
}

pub async fn create_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateMaintenanceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let property = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::PropertyNotFound(body.property_id))?;

    if !user.user.is_admin() {
        let renting = app_state
            .db_client
            .has_active_contract(user.user.id, property.id)
            .await
            .map_err(HttpError::from)?;

        if !renting {
            return Err(HttpError::forbidden("You can only report issues on a property you rent"));
        }
    }

    let description = ammonia::clean(body.description.trim());
    let request = app_state
        .db_client
        .create_maintenance_request(
            property.id,
            user.user.id,
            &description,
            body.priority.unwrap_or(MaintenancePriority::Medium),
        )
        .await
        .map_err(HttpError::from)?;

    app_state
        .notification_service
        .notify(
            user.user.id,
            property.owner_user_id,
            "maintenance",
            &new_request_message(request.priority, &property.full_address()),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "request": request,
        })),
    ))
}

fn new_request_message(priority: MaintenancePriority, address: &str) -> String {
    format!("New {} priority maintenance request at {}", priority.to_str(), address)
}

pub async fn update_request(
    Path(request_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateMaintenanceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let owner_id = app_state
        .db_client
        .get_request_owner(request_id)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Maintenance request {} not found", request_id)))?;

    if owner_id != user.user.id && !user.user.is_admin() {
        return Err(HttpError::forbidden("Only the property owner can update this request"));
    }

    let request = app_state
        .db_client
        .update_maintenance_request(request_id, body)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Maintenance request {} not found", request_id)))?;

    Ok(Json(json!({
        "status": "success",
        "request": request,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_message_names_the_priority() {
        assert_eq!(
            new_request_message(MaintenancePriority::High, "Main St, 4, Lisbon, LX, 1000"),
            "New High priority maintenance request at Main St, 4, Lisbon, LX, 1000"
        );
    }
}
