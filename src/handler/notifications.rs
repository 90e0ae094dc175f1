use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::notificationdtos::{
        NotificationListResponse, NotificationResponse, SendNotificationDto, SendNotificationResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notification_handler() -> Router {
    Router::new()
        .route("/", get(list_notifications).post(send_notification))
        .route("/:id/read", patch(mark_read))
        .route("/:id/unread", patch(mark_unread))
}

pub async fn list_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = app_state.notification_service.list_for(user.user.id).await?;
    let unread = notifications.iter().filter(|n| !n.read_status).count();

    Ok(Json(NotificationListResponse {
        success: true,
        data: notifications,
        unread,
    }))
}

pub async fn send_notification(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<SendNotificationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let (notification, delivery) = app_state
        .notification_service
        .send(user.user.id, body.receiver_id, &body.notification_type, &body.message)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SendNotificationResponse {
            success: true,
            message: "Notification sent successfully".to_string(),
            data: notification,
            delivery,
        }),
    ))
}

async fn toggle_read(
    app_state: &AppState,
    user: &JWTAuthMiddeware,
    notification_id: i64,
    read: bool,
) -> Result<NotificationResponse, HttpError> {
    let notification = app_state
        .notification_service
        .set_read(user.user.id, notification_id, read)
        .await?;

    Ok(NotificationResponse {
        success: true,
        message: if read {
            "Notification marked as read".to_string()
        } else {
            "Notification marked as unread".to_string()
        },
        data: notification,
    })
}

pub async fn mark_read(
    Path(notification_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(toggle_read(&app_state, &user, notification_id, true).await?))
}

pub async fn mark_unread(
    Path(notification_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(toggle_read(&app_state, &user, notification_id, false).await?))
}
