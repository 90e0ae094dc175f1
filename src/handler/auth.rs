use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use validator::Validate;

use crate::{
    db::userdb::UserExt,
    dtos::userdtos::{FilterUserDto, LoginUserDto, RegisterUserDto, Response, UserData, UserLoginResponseDto, UserResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::{blacklist_key, extract_token, login_rate_limit},
    utils::{password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login).layer(middleware::from_fn(login_rate_limit)))
        .route("/logout", post(logout))
}

fn token_cookie(value: String, max_age_minutes: i64) -> Result<HeaderValue, HttpError> {
    let cookie = Cookie::build(("token", value))
        .path("/")
        .max_age(time::Duration::minutes(max_age_minutes))
        .http_only(true)
        .build();

    cookie
        .to_string()
        .parse()
        .map_err(|_| HttpError::server_error(ErrorMessage::ServerError.to_string()))
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let existing_user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(HttpError::from)?;

    if existing_user.is_some() {
        return Err(HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string()));
    }

    let hashed_password =
        password::hash(&body.password).map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(body.first_name, body.last_name, body.email, hashed_password, body.role)
        .await;

    match user {
        Ok(user) => {
            tracing::info!("Registered user {} as {}", user.id, user.role.to_str());
            Ok((
                StatusCode::CREATED,
                Json(UserResponseDto {
                    status: "success".to_string(),
                    data: UserData { user: FilterUserDto::filter_user(&user) },
                }),
            ))
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string()))
        }
        Err(e) => Err(HttpError::from(e)),
    }
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let result = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(HttpError::from)?;

    let user = result.ok_or(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, token_cookie(token.clone(), app_state.env.jwt_maxage)?);

    let mut response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
    })
    .into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

/// Clear the cookie and, when Redis is available, revoke the token until it expires.
pub async fn logout(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    request_headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    let presented = extract_token(&cookie_jar, &request_headers);

    if let (Some(token), Some(redis_client)) = (presented, &app_state.db_client.redis_client) {
        let mut conn = redis_client.clone();
        let ttl_secs = app_state.env.jwt_maxage * 60;
        let result: Result<(), redis::RedisError> = redis::cmd("SET")
            .arg(blacklist_key(&token))
            .arg(1)
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await;

        if let Err(e) = result {
            tracing::error!("Failed to revoke token at logout: {}", e);
        }
    }

    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, token_cookie(String::new(), 0)?);

    let mut response = Json(Response {
        status: "success",
        message: "Logged out successfully".to_string(),
    })
    .into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_is_http_only_and_scoped_to_root() {
        let value = token_cookie("abc".to_string(), 60).unwrap();
        let cookie = value.to_str().unwrap();

        assert!(cookie.starts_with("token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
    }
}
