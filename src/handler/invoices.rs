use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    db::{contractdb::ContractExt, invoicedb::InvoiceExt},
    dtos::contractdtos::{CreateInvoiceDto, UpdateInvoiceStatusDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{contractmodel::PaymentStatus, usermodel::UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn invoice_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(list_invoices).merge(
                post(create_invoice).layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
                })),
            ),
        )
        .route(
            "/:id/status",
            patch(update_invoice_status).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
}

pub async fn list_invoices(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let invoices = match user.user.role {
        UserRole::Owner => app_state.db_client.get_invoices_for_owner(user.user.id).await,
        UserRole::Tenant => app_state.db_client.get_invoices_for_tenant(user.user.id).await,
        UserRole::Admin => app_state.db_client.get_all_invoices().await,
    }
    .map_err(HttpError::from)?;

    Ok(Json(invoices))
}

pub async fn create_invoice(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateInvoiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let contract = app_state
        .db_client
        .get_contract(body.contract_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::ContractNotFound(body.contract_id))?;

    app_state
        .property_service
        .owned_property(&user.user, contract.property_id)
        .await?;

    let invoice = app_state
        .db_client
        .create_invoice(
            contract.id,
            body.issue_date.unwrap_or_else(|| Utc::now().date_naive()),
            body.total_amount,
            body.payment_status.unwrap_or(PaymentStatus::Pending),
        )
        .await
        .map_err(HttpError::from)?;

    app_state
        .notification_service
        .notify(
            user.user.id,
            contract.tenant_user_id,
            "invoice",
            &format!("A new invoice of ${} was issued for contract {}", invoice.total_amount, contract.id),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "invoice": invoice,
        })),
    ))
}

pub async fn update_invoice_status(
    Path(invoice_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateInvoiceStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let owner_id = app_state
        .db_client
        .get_invoice_owner(invoice_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::InvoiceNotFound(invoice_id))?;

    if owner_id != user.user.id && !user.user.is_admin() {
        return Err(HttpError::forbidden("Only the property owner can update this invoice"));
    }

    let invoice = app_state
        .db_client
        .update_invoice_status(invoice_id, body.payment_status)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::InvoiceNotFound(invoice_id))?;

    Ok(Json(json!({
        "status": "success",
        "invoice": invoice,
    })))
}
