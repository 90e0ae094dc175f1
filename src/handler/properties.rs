use std::{path::Path as FsPath, sync::Arc};

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value as JsonValue};
use validator::Validate;

use crate::{
    db::{appointmentdb::AppointmentExt, commentdb::CommentExt, propertydb::PropertyExt},
    dtos::{
        applicationdtos::DetailsAppointment,
        propertydtos::{
            comments_json, property_json, CreatePropertyDto, FilterPropertiesQuery,
            PropertySearchFilters, UpdatePropertyDto,
        },
        userdtos::UserQueryDto,
    },
    error::HttpError,
    handler::{applications, appointments},
    middleware::{auth, role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    service::property_service::{discard_photos, PropertyService},
    AppState,
};

pub const FEATURED_LIMIT: i64 = 3;

pub fn property_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(get_owner_properties)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
                }))
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/create",
            post(create_property)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
                }))
                .layer(middleware::from_fn(auth)),
        )
        .route("/filter", get(filter_properties))
        .route("/getProperties", get(get_properties))
        .route("/featured", get(featured_properties))
        .route("/getPropertyDetails/:id", get(get_property_details))
        .route(
            "/appointment",
            post(appointments::create_appointment)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Tenant, UserRole::Admin])
                }))
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/applications",
            get(applications::list_applications).layer(middleware::from_fn(auth)),
        )
        .route(
            "/applicate",
            post(applications::create_application)
                .layer(middleware::from_fn(|state, req, next| {
                    role_check(state, req, next, vec![UserRole::Tenant])
                }))
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/:id",
            get(show_property).merge(
                put(update_property)
                    .merge(delete(destroy_property))
                    .layer(middleware::from_fn(|state, req, next| {
                        role_check(state, req, next, vec![UserRole::Owner, UserRole::Admin])
                    }))
                    .layer(middleware::from_fn(auth)),
            ),
        )
}

/// Properties of the caller, or of `?user_id=` when the caller is an admin.
pub async fn get_owner_properties(
    Query(query_params): Query<UserQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let owner_id = match query_params.user_id {
        Some(user_id) if user.user.is_admin() => user_id,
        _ => user.user.id,
    };

    let properties = app_state
        .db_client
        .get_properties_by_owner(owner_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(PropertyService::properties_json(&properties, &app_state.env)))
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let property = app_state
        .property_service
        .create_property(&user.user, body, FsPath::new(&app_state.env.upload_dir))
        .await?;

    Ok(property_created(property_json(&property, None, &app_state.env)))
}

fn property_created(property: JsonValue) -> Json<JsonValue> {
    Json(json!({
        "status": "success",
        "message": "Property created successfully",
        "property": property,
    }))
}

pub async fn filter_properties(
    Query(query_params): Query<FilterPropertiesQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let filters = PropertySearchFilters::try_from(query_params).map_err(HttpError::bad_request)?;

    let properties = app_state
        .db_client
        .search_properties(&filters)
        .await
        .map_err(HttpError::from)?;

    let properties = app_state
        .property_service
        .with_comments(properties, &app_state.env)
        .await?;

    Ok(Json(properties))
}

pub async fn get_properties(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .db_client
        .get_available_properties()
        .await
        .map_err(HttpError::from)?;

    let properties = app_state
        .property_service
        .with_comments(properties, &app_state.env)
        .await?;

    Ok(Json(properties))
}

pub async fn featured_properties(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .db_client
        .get_featured_properties(FEATURED_LIMIT)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(PropertyService::properties_json(&properties, &app_state.env)))
}

pub async fn get_property_details(
    Path(property_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_with_zone(property_id)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Property {} not found", property_id)))?;

    let (comments, appointments) = tokio::try_join!(
        app_state.db_client.get_comments_for_property(property_id),
        app_state.db_client.get_appointments_for_property(property_id),
    )
    .map_err(HttpError::from)?;

    let appointments: Vec<DetailsAppointment> = appointments.into_iter().map(Into::into).collect();

    let mut value = property_json(&property.property, Some(&property.zone_name), &app_state.env);
    if let Some(object) = value.as_object_mut() {
        object.insert("comments".to_string(), comments_json(&comments));
        object.insert("appointments".to_string(), json!(appointments));
    }

    Ok(Json(value))
}

pub async fn show_property(
    Path(property_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Property {} not found", property_id)))?;

    Ok(Json(property_json(&property, None, &app_state.env)))
}

pub async fn update_property(
    Path(property_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    app_state
        .property_service
        .owned_property(&user.user, property_id)
        .await?;

    let property = app_state
        .db_client
        .update_property(property_id, body)
        .await
        .map_err(HttpError::from)?
        .ok_or_else(|| HttpError::not_found(format!("Property {} not found", property_id)))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Property updated successfully",
        "property": property_json(&property, None, &app_state.env),
    })))
}

pub async fn destroy_property(
    Path(property_id): Path<i64>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .property_service
        .owned_property(&user.user, property_id)
        .await?;

    app_state
        .db_client
        .delete_property(property_id)
        .await
        .map_err(HttpError::from)?;

    discard_photos(FsPath::new(&app_state.env.upload_dir), &property.property_photos_path.0).await;

    Ok(Json(json!({ "message": "Property deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn created_property_answers_ok() {
        let response = property_created(json!({ "id": 7, "property_code": "PRO-1234" })).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn created_property_body_wraps_the_property() {
        let Json(body) = property_created(json!({ "id": 7 }));
        assert_eq!(body["status"], "success");
        assert_eq!(body["property"]["id"], 7);
    }
}
