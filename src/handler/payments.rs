use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::{
    db::invoicedb::InvoiceExt,
    dtos::contractdtos::RecordPaymentDto,
    error::HttpError,
    handler::contracts::ensure_can_view_tenant,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    service::error::ServiceError,
    AppState,
};

pub fn payment_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(record_payment).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
        .route("/:tenant_id", get(get_payment_history))
}

pub async fn get_payment_history(
    Path(tenant_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_can_view_tenant(&user, tenant_id)?;

    let ledger = app_state
        .db_client
        .get_tenant_ledger(tenant_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(ledger))
}

pub async fn record_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<RecordPaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let owner_id = app_state
        .db_client
        .get_invoice_owner(body.invoice_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::InvoiceNotFound(body.invoice_id))?;

    if owner_id != user.user.id && !user.user.is_admin() {
        return Err(HttpError::forbidden("Only the property owner can record payments"));
    }

    let payment_date = body.payment_date.unwrap_or_else(|| Utc::now().date_naive());

    let (payment, invoice) = app_state
        .db_client
        .record_payment(body.invoice_id, payment_date, body.amount_paid)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::InvoiceNotFound(body.invoice_id))?;

    tracing::info!(
        "Payment {} recorded on invoice {}, invoice now {:?}",
        payment.id,
        invoice.id,
        invoice.payment_status
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "payment": payment,
            "invoice": invoice,
        })),
    ))
}
