use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    db::userdb::UserExt,
    error::{ErrorMessage, HttpError},
    models::usermodel::{User, UserRole},
    utils::token,
    AppState,
};

pub const MAX_LOGIN_ATTEMPTS: i64 = 5;
const LOGIN_WINDOW_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JWTAuthMiddeware {
    pub user: User,
}

pub fn blacklist_key(token: &str) -> String {
    format!("token_blacklist:{}", token)
}

/// Token from the `token` cookie, or else from `Authorization: Bearer`.
pub fn extract_token(cookie_jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    cookie_jar
        .get("token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| auth_value.strip_prefix("Bearer ").map(str::to_owned))
        })
}

pub async fn auth(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, req.headers())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let token_details = match token::decode_token(token.as_str(), app_state.env.jwt_secret.as_bytes()) {
        Ok(token_details) => token_details,
        Err(_) => {
            return Err(HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()));
        }
    };

    // Tokens revoked at logout
    if let Some(redis_client) = &app_state.db_client.redis_client {
        let mut conn = redis_client.clone();
        let is_blacklisted: bool = redis::cmd("EXISTS")
            .arg(blacklist_key(&token))
            .query_async(&mut conn)
            .await
            .unwrap_or(false);

        if is_blacklisted {
            return Err(HttpError::unauthorized("Token has been revoked. Please login again."));
        }
    }

    let user_id = token_details
        .parse::<i64>()
        .map_err(|_| HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()))?;

    let user = app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|_| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    let user = user.ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNoLongerExist.to_string()))?;

    req.extensions_mut().insert(JWTAuthMiddeware { user });

    Ok(next.run(req).await)
}

pub async fn role_check(
    Extension(_app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
    required_roles: Vec<UserRole>,
) -> Result<impl IntoResponse, HttpError> {
    let user = req
        .extensions()
        .get::<JWTAuthMiddeware>()
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::UserNotAuthenticated.to_string()))?;

    if !required_roles.contains(&user.user.role) {
        return Err(HttpError::new(ErrorMessage::PermissionDenied.to_string(), StatusCode::FORBIDDEN));
    }

    Ok(next.run(req).await)
}

/// Limit login attempts per client address. Skipped when Redis is not configured.
fn rate_limit_failure(e: redis::RedisError) -> HttpError {
    tracing::error!("Login rate limit check failed: {}", e);
    HttpError::server_error(ErrorMessage::ServerError.to_string())
}

pub async fn login_rate_limit(
    Extension(app_state): Extension<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    if let Some(redis_client) = &app_state.db_client.redis_client {
        let ip = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .unwrap_or("unknown")
            .to_string();

        let key = format!("rl:login:{}", ip);
        let mut conn = redis_client.clone();

        let count: i64 = redis::cmd("INCR")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(rate_limit_failure)?;

        if count == 1 {
            let _: () = redis::cmd("EXPIRE")
                .arg(&key)
                .arg(LOGIN_WINDOW_SECS)
                .query_async(&mut conn)
                .await
                .map_err(rate_limit_failure)?;
        }

        if count > MAX_LOGIN_ATTEMPTS {
            tracing::warn!("Login rate limit hit for {}", ip);
            return Err(HttpError::new("Too many attempts", StatusCode::TOO_MANY_REQUESTS));
        }
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn cookie_wins_over_header() {
        let jar = CookieJar::new().add(Cookie::new("token", "from-cookie"));
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer from-header")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_token(&jar, req.headers()).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_header_is_accepted() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&CookieJar::new(), req.headers()).as_deref(), Some("abc.def"));

        let basic = Request::builder()
            .header(header::AUTHORIZATION, "Basic xyz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_token(&CookieJar::new(), basic.headers()), None);
    }

    #[test]
    fn logout_headers_yield_the_same_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer signed.jwt".parse().unwrap());
        assert_eq!(extract_token(&CookieJar::new(), &headers).as_deref(), Some("signed.jwt"));
        assert_eq!(extract_token(&CookieJar::new(), &HeaderMap::new()), None);
    }
}
