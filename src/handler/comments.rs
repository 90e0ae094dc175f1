use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::{commentdb::CommentExt, contractdb::ContractExt, propertydb::PropertyExt},
    dtos::{applicationdtos::CreateCommentDto, propertydtos::comments_json},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    service::error::ServiceError,
    AppState,
};

pub fn comment_handler() -> Router {
    Router::new().route(
        "/",
        get(get_comments).merge(post(create_comment).layer(middleware::from_fn(
            |state, req, next| role_check(state, req, next, vec![UserRole::Tenant, UserRole::Admin]),
        ))),
    )
}

/// Comments on the property the caller currently rents.
pub async fn get_comments(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let rented = app_state
        .db_client
        .get_rented_property(user.user.id)
        .await
        .map_err(HttpError::from)?;

    let Some(rented) = rented else {
        return Ok(Json(json!("No property found")));
    };

    let comments = app_state
        .db_client
        .get_comments_for_property(rented.property_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(comments_json(&comments)))
}

pub async fn create_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateCommentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let text = ammonia::clean(body.comment.trim());
    if text.is_empty() {
        return Err(HttpError::bad_request("Comment cannot be empty"));
    }

    app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(HttpError::from)?
        .ok_or(ServiceError::PropertyNotFound(body.property_id))?;

    let rating = app_state
        .db_client
        .create_comment(body.property_id, user.user.id, &text, body.comment_rate)
        .await
        .map_err(HttpError::from)?;

    tracing::info!(
        "User {} rated property {} with {}, average now {:?}",
        user.user.id,
        body.property_id,
        body.comment_rate,
        rating
    );

    let comments = app_state
        .db_client
        .get_comments_for_property(body.property_id)
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(comments_json(&comments))))
}
