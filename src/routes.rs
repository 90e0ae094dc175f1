use std::{path::Path, sync::Arc};

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handler::{
        applications::application_handler,
        appointments::appointment_handler,
        auth::auth_handler,
        comments::comment_handler,
        contracts::{contract_handler, tenant_contract_handler},
        dashboard::dashboard_handler,
        invoices::invoice_handler,
        maintenance::maintenance_handler,
        notifications::notification_handler,
        pages::page_handler,
        payments::payment_handler,
        properties::property_handler,
        users::users_handler,
        zones::zone_handler,
    },
    middleware::{auth, role_check},
    models::usermodel::UserRole,
    utils::image_utils::PHOTO_FOLDER,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let contract_routes = Router::new()
        .merge(
            contract_handler().layer(middleware::from_fn(|state, req, next| {
                role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
            })),
        )
        .merge(tenant_contract_handler())
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/zones", zone_handler())
        // Gated per route
        .nest("/properties", property_handler())
        .merge(users_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/rental-applications",
            application_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/comments", comment_handler().layer(middleware::from_fn(auth)))
        .nest("/contracts", contract_routes)
        .nest(
            "/appointments",
            appointment_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/maintenance",
            maintenance_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/invoices", invoice_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/payment-history",
            payment_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/dashboard",
            dashboard_handler()
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Owner])
                }))
                .layer(middleware::from_fn(auth)),
        )
        .nest(
            "/notifications",
            notification_handler().layer(middleware::from_fn(auth)),
        );

    let photos = ServeDir::new(Path::new(&app_state.env.upload_dir).join(PHOTO_FOLDER));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
        .merge(page_handler())
        .nest_service(&format!("/{}", PHOTO_FOLDER), photos)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{config::Config, db::db::DBClient};

    // The pool never connects; every request here is answered before a query runs.
    fn test_router() -> Router {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        create_router(Arc::new(AppState::new(DBClient::new(pool), config)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn welcome_page_renders_without_login() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = body_json(response).await;
        assert_eq!(page["component"], "Welcome");
        assert_eq!(page["url"], "/");
    }

    #[tokio::test]
    async fn protected_api_requires_token() {
        for uri in ["/api/user", "/api/dashboard", "/api/notifications", "/api/contracts"] {
            let response = test_router()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn gated_page_rejects_garbage_token() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn filter_rejects_unparseable_price() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/properties/filter?maxPrice=cheap")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
