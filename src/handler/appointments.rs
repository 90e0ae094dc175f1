use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use serde_json::json;

use crate::{
    db::{appointmentdb::AppointmentExt, propertydb::PropertyExt},
    dtos::applicationdtos::{CreateAppointmentDto, UpdateAppointmentStatusDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{applicationmodel::AppointmentStatus, usermodel::UserRole},
    service::error::ServiceError,
    AppState,
};

pub fn appointment_handler() -> Router {
    Router::new()
        .route("/", get(list_appointments))
        .route(
            "/:id/status",
            patch(update_appointment_status).layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
}

pub async fn create_appointment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateAppointmentDto>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::PropertyNotFound(body.property_id))?;

    let appointment = app_state
        .db_client
        .create_appointment(body.property_id, user.user.id, body.requested_date)
        .await
        .map_err(HttpError::from)?;

    let message = format!(
        "{} requested a visit to {} on {}",
        user.user.full_name(),
        property.full_address(),
        appointment.requested_date.format("%Y-%m-%d %H:%M")
    );
    app_state
        .notification_service
        .notify(user.user.id, property.owner_user_id, "appointment", &message)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "appointment": appointment,
        })),
    ))
}

/// Tenants see the visits they booked, owners the visits to their properties.
pub async fn list_appointments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let appointments = match user.user.role {
        UserRole::Tenant => app_state.db_client.get_appointments_for_user(user.user.id).await,
        UserRole::Owner => app_state.db_client.get_appointments_for_owner(Some(user.user.id)).await,
        UserRole::Admin => app_state.db_client.get_appointments_for_owner(None).await,
    }
    .map_err(HttpError::from)?;

    Ok(Json(appointments))
}

pub async fn update_appointment_status(
    Path(appointment_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateAppointmentStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    let owner_id = app_state
        .db_client
        .get_appointment_owner(appointment_id)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Appointment {} not found", appointment_id)))?;

    if owner_id != user.user.id && !user.user.is_admin() {
        return Err(HttpError::forbidden("Only the property owner can update this appointment"));
    }

    let appointment = app_state
        .db_client
        .update_appointment_status(appointment_id, body.status)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Appointment {} not found", appointment_id)))?;

    app_state
        .notification_service
        .notify(
            user.user.id,
            appointment.user_id,
            "appointment",
            &visit_update_message(&appointment.status),
        )
        .await;

    Ok(Json(json!({
        "status": "success",
        "appointment": appointment,
    })))
}

fn visit_update_message(status: &AppointmentStatus) -> String {
    format!("Your visit request was updated to {}", status.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_update_names_the_status() {
        assert_eq!(
            visit_update_message(&AppointmentStatus::Confirmed),
            "Your visit request was updated to Confirmed"
        );
    }
}
