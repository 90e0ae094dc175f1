use std::sync::Arc;

use axum::{
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::{FilterUserDto, Response, UpdateProfileDto, UserData, UserResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/user", get(get_me))
        .route(
            "/profile",
            get(get_me).patch(update_profile).delete(delete_profile),
        )
}

pub async fn get_me(
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let filtered_user = FilterUserDto::filter_user(&user.user);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData { user: filtered_user },
    }))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    if let Some(email) = &body.email {
        let existing = app_state
            .db_client
            .get_user(None, Some(email))
            .await
            .map_err(HttpError::from)?;

        if existing.is_some_and(|other| other.id != user.user.id) {
            return Err(HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string()));
        }
    }

    let updated = app_state
        .db_client
        .update_user_profile(user.user.id, body.first_name, body.last_name, body.email)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData { user: FilterUserDto::filter_user(&updated) },
    }))
}

pub async fn delete_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let deleted = app_state
        .db_client
        .delete_user(user.user.id)
        .await
        .map_err(HttpError::from)?;

    if deleted == 0 {
        return Err(HttpError::not_found(ErrorMessage::UserNoLongerExist.to_string()));
    }

    tracing::info!("User {} deleted their account", user.user.id);

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        header::HeaderValue::from_static("token=; Path=/; Max-Age=0; HttpOnly"),
    );

    let mut response = Json(Response {
        status: "success",
        message: "Account deleted".to_string(),
    })
    .into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}
