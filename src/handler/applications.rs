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

use crate::{
    db::{applicationdb::ApplicationExt, propertydb::PropertyExt},
    dtos::applicationdtos::{ApplicationCreatedResponse, ApplicationDecisionResponse, CreateApplicationDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{applicationmodel::ApplicationStatus, usermodel::UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn application_handler() -> Router {
    Router::new()
        .route("/", get(list_applications))
        .route(
            "/:id/approve",
            post(approve_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
        .route(
            "/:id/reject",
            post(reject_application).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
}

/// Owners see applications on their properties, tenants their own, admins all.
pub async fn list_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = match user.user.role {
        UserRole::Admin => app_state.db_client.get_applications_for_owner(None).await,
        UserRole::Owner => app_state.db_client.get_applications_for_owner(Some(user.user.id)).await,
        UserRole::Tenant => app_state.db_client.get_applications_for_tenant(user.user.id).await,
    }
    .map_err(HttpError::from)?;

    Ok(Json(json!({
        "applications": applications,
        "status": 200,
    })))
}

pub async fn create_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateApplicationDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::PropertyNotFound(body.property_id))?;

    let application_date = body.application_date.unwrap_or_else(|| Utc::now().date_naive());

    let inserted = app_state
        .db_client
        .create_application(body.property_id, user.user.id, application_date)
        .await
        .map_err(HttpError::from)?;
    let response = application_created(inserted)?;

    tracing::info!(
        "Tenant {} applied to property {} (application {})",
        user.user.id,
        body.property_id,
        response.application
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// `None` from the insert means the tenant already applied to this property.
fn application_created(inserted: Option<i64>) -> Result<ApplicationCreatedResponse, ServiceError> {
    let application_id = inserted.ok_or(ServiceError::DuplicateApplication)?;

    Ok(ApplicationCreatedResponse {
        message: "Application created successfully".to_string(),
        application: application_id,
        status: StatusCode::CREATED.as_u16(),
    })
}

async fn decide(
    app_state: &AppState,
    user: &JWTAuthMiddeware,
    application_id: i64,
    status: ApplicationStatus,
) -> Result<ApplicationDecisionResponse, HttpError> {
    let application = app_state
        .db_client
        .get_application(application_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::ApplicationNotFound(application_id))?;

    let property = app_state
        .property_service
        .owned_property(&user.user, application.property_id)
        .await?;

    let application = app_state
        .db_client
        .update_application_status(application_id, status)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::ApplicationNotFound(application_id))?;

    let message = format!(
        "Your application for {} was {}",
        property.full_address(),
        status.to_str().to_lowercase()
    );
    app_state
        .notification_service
        .notify(user.user.id, application.tenant_user_id, "application", &message)
        .await;

    Ok(ApplicationDecisionResponse {
        status: "success",
        message: format!("Application {}", status.to_str().to_lowercase()),
        application,
    })
}

pub async fn approve_application(
    Path(application_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let response = decide(&app_state, &user, application_id, ApplicationStatus::Approved).await?;
    Ok(Json(response))
}

pub async fn reject_application(
    Path(application_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let response = decide(&app_state, &user, application_id, ApplicationStatus::Rejected).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_application_is_a_conflict() {
        let err = HttpError::from(application_created(None).unwrap_err());
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn first_application_reports_its_id() {
        let response = application_created(Some(42)).unwrap();
        assert_eq!(response.application, 42);
        assert_eq!(response.status, 201);
    }
}
