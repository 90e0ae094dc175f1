use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::{contractdb::ContractExt, userdb::UserExt},
    dtos::{contractdtos::CreateContractDto, userdtos::{FilterUserDto, UserListResponseDto}},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::usermodel::UserRole,
    service::error::ServiceError,
    AppState,
};

/// Mounted behind `role_check(Owner, admin)` by the router, except the tenant lookups.
pub fn contract_handler() -> Router {
    Router::new()
        .route("/", get(list_contracts))
        .route("/create", post(create_contract))
        .route("/user_tenant", get(list_tenant_users))
}

pub fn tenant_contract_handler() -> Router {
    Router::new()
        .route("/tenant/:tenant_id", get(get_tenant_contracts))
        .route("/rented/:tenant_id", get(get_rented_property))
}

fn parse_tenant_id(raw: &str) -> Result<i64, HttpError> {
    raw.parse::<i64>()
        .map_err(|_| HttpError::bad_request(format!("Invalid tenant id: {}", raw)))
}

pub async fn list_contracts(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let owner_filter = if user.user.is_admin() { None } else { Some(user.user.id) };

    let contracts = app_state
        .db_client
        .get_contracts_for_owner(owner_filter)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(contracts))
}

pub async fn create_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    app_state
        .property_service
        .owned_property(&user.user, body.property_id)
        .await?;

    let tenant = app_state
        .db_client
        .get_user(Some(body.tenant_user_id), None)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::UserNotFound(body.tenant_user_id))?;

    if tenant.role != UserRole::Tenant {
        return Err(HttpError::bad_request(format!("User {} is not a tenant", tenant.id)));
    }

    let contract = app_state
        .db_client
        .create_contract(body)
        .await
        .map_err(HttpError::from)?;

    tracing::info!(
        "Contract {} created for tenant {} on property {}",
        contract.id,
        contract.tenant_user_id,
        contract.property_id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Contract created successfully",
            "contract": contract,
        })),
    ))
}

pub async fn list_tenant_users(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let users = app_state
        .db_client
        .get_users_by_role(UserRole::Tenant)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        results: users.len(),
        users: FilterUserDto::filter_users(&users),
    }))
}

pub async fn get_tenant_contracts(
    Path(tenant_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    ensure_can_view_tenant(&user, tenant_id)?;

    let contracts = app_state
        .db_client
        .get_contracts_for_tenant(tenant_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(contracts))
}

pub async fn get_rented_property(
    Path(tenant_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    ensure_can_view_tenant(&user, tenant_id)?;

    let rented = app_state
        .db_client
        .get_rented_property(tenant_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(rented))
}

/// Tenants may only read their own records.
pub fn ensure_can_view_tenant(user: &JWTAuthMiddeware, tenant_id: i64) -> Result<(), HttpError> {
    if user.user.role == UserRole::Tenant && user.user.id != tenant_id {
        return Err(HttpError::forbidden("You can only view your own records"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_tenant_id_is_a_bad_request() {
        let err = parse_tenant_id("abc").unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(parse_tenant_id("42").unwrap(), 42);
    }
}
