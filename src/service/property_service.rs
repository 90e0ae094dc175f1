use std::{path::Path, sync::Arc};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{json, Value as JsonValue};

use crate::{
    config::Config,
    db::{commentdb::CommentExt, db::DBClient, propertydb::PropertyExt, zonedb::ZoneExt},
    dtos::propertydtos::{comments_json, property_json, CreatePropertyDto, PhotoUploadDto},
    models::{
        commentmodel::CommentWithAuthor,
        propertymodel::{Property, PropertyWithZone},
        usermodel::User,
    },
    service::error::ServiceError,
    utils::image_utils::{prepare_photo, remove_photo, write_photo},
};

/// `PTY-` followed by four random digits and the row id.
pub fn generate_property_code(property_id: i64) -> String {
    let prefix: u32 = rand::rng().random_range(1000..=9999);
    format!("PTY-{}{}", prefix, property_id)
}

/// Mean of the ratings rounded to two decimals, `None` when there are none.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    let mean = sum as f64 / ratings.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

/// Store every upload or none of them. All uploads are checked before the
/// first write, and files already written are removed when a later write fails.
pub async fn store_photos(
    public_dir: &Path,
    uploads: &[PhotoUploadDto],
    at: DateTime<Utc>,
) -> Result<Vec<String>, ServiceError> {
    let prepared = uploads
        .iter()
        .map(|upload| prepare_photo(&upload.file_name, &upload.data))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServiceError::Validation(e.to_string()))?;

    let mut stored = Vec::with_capacity(prepared.len());
    for photo in &prepared {
        match write_photo(public_dir, photo, at).await {
            Ok(path) => stored.push(path),
            Err(e) => {
                discard_photos(public_dir, &stored).await;
                return Err(ServiceError::Storage(format!("{:#}", e)));
            }
        }
    }

    Ok(stored)
}

/// Best effort removal of stored photos.
pub async fn discard_photos(public_dir: &Path, paths: &[String]) {
    for path in paths {
        if let Err(e) = remove_photo(public_dir, path).await {
            tracing::warn!("Photo cleanup failed for {}: {}", path, e);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PropertyService {
    db_client: Arc<DBClient>,
}

impl PropertyService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn create_property(
        &self,
        owner: &User,
        mut property_data: CreatePropertyDto,
        public_dir: &Path,
    ) -> Result<Property, ServiceError> {
        if !self.db_client.zone_exists(property_data.zone_id).await? {
            return Err(ServiceError::Validation(format!(
                "The selected zone {} is invalid",
                property_data.zone_id
            )));
        }

        let uploads = std::mem::take(&mut property_data.property_photos);
        let photo_paths = store_photos(public_dir, &uploads, Utc::now()).await?;

        let property = match self
            .db_client
            .create_property(owner.id, property_data, photo_paths.clone())
            .await
        {
            Ok(property) => property,
            Err(e) => {
                discard_photos(public_dir, &photo_paths).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            "Property {} ({:?}) created by user {}",
            property.id,
            property.property_code,
            owner.id
        );

        Ok(property)
    }

    /// Load a property the user may modify. Admins may modify any property.
    pub async fn owned_property(&self, user: &User, property_id: i64) -> Result<Property, ServiceError> {
        let property = self
            .db_client
            .get_property_by_id(property_id)
            .await?
            .ok_or(ServiceError::PropertyNotFound(property_id))?;

        if property.owner_user_id != user.id && !user.is_admin() {
            return Err(ServiceError::NotPropertyOwner(user.id, property_id));
        }

        Ok(property)
    }

    /// Serialize properties with their comments, fetched in one batched query.
    pub async fn with_comments(
        &self,
        properties: Vec<PropertyWithZone>,
        config: &Config,
    ) -> Result<Vec<JsonValue>, ServiceError> {
        let ids: Vec<i64> = properties.iter().map(|p| p.property.id).collect();
        let comments = self.db_client.get_comments_for_properties(&ids).await?;

        Ok(properties
            .iter()
            .map(|p| {
                let own: Vec<CommentWithAuthor> = comments
                    .iter()
                    .filter(|c| c.comment.property_id == p.property.id)
                    .cloned()
                    .collect();

                let mut value = property_json(&p.property, Some(&p.zone_name), config);
                if let Some(object) = value.as_object_mut() {
                    object.insert("comments".to_string(), comments_json(&own));
                }
                value
            })
            .collect())
    }

    pub fn properties_json(properties: &[PropertyWithZone], config: &Config) -> JsonValue {
        json!(properties
            .iter()
            .map(|p| property_json(&p.property, Some(&p.zone_name), config))
            .collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    use super::*;
    use crate::utils::image_utils::PHOTO_FOLDER;

    fn upload(file_name: &str, bytes: &[u8]) -> PhotoUploadDto {
        PhotoUploadDto {
            file_name: file_name.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    #[tokio::test]
    async fn invalid_upload_leaves_no_files_behind() {
        let dir = std::env::temp_dir().join(format!("rentnest-atomic-{}", std::process::id()));
        let uploads = [upload("front.png", b"front"), upload("contract.pdf", b"pdf")];

        let err = store_photos(&dir, &uploads, Utc::now()).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!dir.join(PHOTO_FOLDER).exists());
    }

    #[tokio::test]
    async fn unwritable_folder_is_a_storage_error() {
        // A regular file where the upload directory should be
        let blocker = std::env::temp_dir().join(format!("rentnest-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = store_photos(&blocker, &[upload("front.png", b"front")], Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let _ = std::fs::remove_file(&blocker);
    }

    #[tokio::test]
    async fn stores_all_uploads_and_discards_them() {
        let dir = std::env::temp_dir().join(format!("rentnest-batch-{}", std::process::id()));
        let uploads = [upload("a.png", b"a"), upload("b.jpg", b"b")];

        let stored = store_photos(&dir, &uploads, Utc::now()).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|path| dir.join(path).exists()));

        discard_photos(&dir, &stored).await;
        assert!(stored.iter().all(|path| !dir.join(path).exists()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn average_of_three_and_five_is_four() {
        assert_eq!(average_rating(&[3, 5]), Some(4.0));
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        assert_eq!(average_rating(&[4, 4, 5]), Some(4.33));
        assert_eq!(average_rating(&[1, 2]), Some(1.5));
        assert_eq!(average_rating(&[]), None);
    }

    #[test]
    fn property_code_embeds_the_id() {
        let code = generate_property_code(42);
        assert!(code.starts_with("PTY-"));
        assert!(code.ends_with("42"));

        let prefix: u32 = code[4..8].parse().unwrap();
        assert!((1000..=9999).contains(&prefix));
        assert_eq!(code.len(), "PTY-".len() + 4 + 2);
    }
}
