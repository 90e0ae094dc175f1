use async_trait::async_trait;
use sqlx::types::Json;

use crate::{
    db::db::DBClient,
    dtos::propertydtos::{CreatePropertyDto, PropertySearchFilters, UpdatePropertyDto},
    models::propertymodel::{Property, PropertyWithZone},
    service::property_service::generate_property_code,
};

const WITH_ZONE: &str = r#"
    SELECT p.*, z.name AS zone_name
    FROM properties p
    JOIN zones z ON z.id = p.zone_id
"#;

#[async_trait]
pub trait PropertyExt {
    async fn create_property(
        &self,
        owner_id: i64,
        property_data: CreatePropertyDto,
        photo_paths: Vec<String>,
    ) -> Result<Property, sqlx::Error>;

    async fn update_property(
        &self,
        property_id: i64,
        property_data: UpdatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error>;

    async fn delete_property(&self, property_id: i64) -> Result<u64, sqlx::Error>;

    async fn get_property_by_id(&self, property_id: i64) -> Result<Option<Property>, sqlx::Error>;

    async fn get_property_with_zone(
        &self,
        property_id: i64,
    ) -> Result<Option<PropertyWithZone>, sqlx::Error>;

    async fn get_available_properties(&self) -> Result<Vec<PropertyWithZone>, sqlx::Error>;

    async fn get_featured_properties(&self, limit: i64) -> Result<Vec<PropertyWithZone>, sqlx::Error>;

    async fn get_properties_by_owner(&self, owner_id: i64) -> Result<Vec<PropertyWithZone>, sqlx::Error>;

    async fn search_properties(
        &self,
        filters: &PropertySearchFilters,
    ) -> Result<Vec<PropertyWithZone>, sqlx::Error>;
}

#[async_trait]
impl PropertyExt for DBClient {
    async fn create_property(
        &self,
        owner_id: i64,
        property_data: CreatePropertyDto,
        photo_paths: Vec<String>,
    ) -> Result<Property, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                street, number, colony, city, state, postal_code, availability,
                total_bathrooms, half_bathrooms, total_rooms, total_m2, surface_built,
                total_surface, antiquity, maintenance, state_conservation, wineries,
                closets, levels, parking, have_parking, accept_mascots, property_price,
                property_details, zone_id, owner_user_id, general_features, services,
                exteriors, environmentals, property_photos_path
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31
            )
            RETURNING *
            "#,
        )
        .bind(&property_data.street)
        .bind(&property_data.number)
        .bind(&property_data.colony)
        .bind(&property_data.city)
        .bind(&property_data.state)
        .bind(&property_data.postal_code)
        .bind(property_data.availability)
        .bind(property_data.total_bathrooms)
        .bind(property_data.half_bathrooms)
        .bind(property_data.total_rooms)
        .bind(property_data.total_m2)
        .bind(property_data.surface_built)
        .bind(&property_data.total_surface)
        .bind(property_data.antiquity)
        .bind(&property_data.maintenance)
        .bind(&property_data.state_conservation)
        .bind(property_data.wineries)
        .bind(property_data.closets)
        .bind(property_data.levels)
        .bind(property_data.parking)
        .bind(property_data.have_parking)
        .bind(property_data.accept_mascots)
        .bind(&property_data.property_price)
        .bind(&property_data.property_details)
        .bind(property_data.zone_id)
        .bind(owner_id)
        .bind(Json(property_data.general_features.unwrap_or_default()))
        .bind(Json(property_data.services.unwrap_or_default()))
        .bind(Json(property_data.exteriors.unwrap_or_default()))
        .bind(Json(property_data.environmentals.unwrap_or_default()))
        .bind(Json(photo_paths))
        .fetch_one(&mut *tx)
        .await?;

        // The code embeds the id, so it can only be set once the row exists
        let property = sqlx::query_as::<_, Property>(
            r#"UPDATE properties SET property_code = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(property.id)
        .bind(generate_property_code(property.id))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(property)
    }

    async fn update_property(
        &self,
        property_id: i64,
        property_data: UpdatePropertyDto,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties
            SET street = $2, number = $3, colony = $4, city = $5, state = $6,
                postal_code = $7, availability = $8, total_bathrooms = $9,
                half_bathrooms = $10, total_rooms = $11, total_m2 = $12,
                surface_built = $13, total_surface = $14, antiquity = $15,
                maintenance = $16, state_conservation = $17, wineries = $18,
                closets = $19, levels = $20, parking = $21, have_parking = $22,
                accept_mascots = $23, property_price = $24, property_details = $25,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(&property_data.street)
        .bind(&property_data.number)
        .bind(&property_data.colony)
        .bind(&property_data.city)
        .bind(&property_data.state)
        .bind(&property_data.postal_code)
        .bind(property_data.availability)
        .bind(property_data.total_bathrooms)
        .bind(property_data.half_bathrooms)
        .bind(property_data.total_rooms)
        .bind(property_data.total_m2)
        .bind(property_data.surface_built)
        .bind(&property_data.total_surface)
        .bind(property_data.antiquity)
        .bind(&property_data.maintenance)
        .bind(&property_data.state_conservation)
        .bind(property_data.wineries)
        .bind(property_data.closets)
        .bind(property_data.levels)
        .bind(property_data.parking)
        .bind(property_data.have_parking)
        .bind(property_data.accept_mascots)
        .bind(&property_data.property_price)
        .bind(&property_data.property_details)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_property(&self, property_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(r#"DELETE FROM properties WHERE id = $1"#)
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn get_property_by_id(&self, property_id: i64) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as::<_, Property>(r#"SELECT * FROM properties WHERE id = $1"#)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_property_with_zone(
        &self,
        property_id: i64,
    ) -> Result<Option<PropertyWithZone>, sqlx::Error> {
        sqlx::query_as::<_, PropertyWithZone>(&format!("{} WHERE p.id = $1", WITH_ZONE))
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_available_properties(&self) -> Result<Vec<PropertyWithZone>, sqlx::Error> {
        sqlx::query_as::<_, PropertyWithZone>(&format!(
            "{} WHERE p.availability = 'Available' ORDER BY p.created_at DESC",
            WITH_ZONE
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_featured_properties(&self, limit: i64) -> Result<Vec<PropertyWithZone>, sqlx::Error> {
        sqlx::query_as::<_, PropertyWithZone>(&format!(
            "{} WHERE p.availability = 'Available' ORDER BY p.rental_rate ASC NULLS LAST, p.id LIMIT $1",
            WITH_ZONE
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_properties_by_owner(&self, owner_id: i64) -> Result<Vec<PropertyWithZone>, sqlx::Error> {
        sqlx::query_as::<_, PropertyWithZone>(&format!(
            "{} WHERE p.owner_user_id = $1 ORDER BY p.created_at DESC",
            WITH_ZONE
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn search_properties(
        &self,
        filters: &PropertySearchFilters,
    ) -> Result<Vec<PropertyWithZone>, sqlx::Error> {
        sqlx::query_as::<_, PropertyWithZone>(&format!(
            r#"{}
            WHERE p.availability = 'Available'
            AND ($1::numeric IS NULL OR p.property_price <= $1)
            AND ($2::text IS NULL OR z.name ILIKE '%' || $2 || '%')
            AND ($3::bool IS NULL OR p.accept_mascots = $3)
            AND ($4::bool IS NULL OR p.have_parking = $4)
            AND ($5::int IS NULL OR p.total_rooms >= $5)
            AND ($6::int IS NULL OR p.total_bathrooms + COALESCE(p.half_bathrooms, 0) >= $6)
            AND ($7::int IS NULL OR p.total_m2 >= $7)
            ORDER BY p.property_price ASC, p.id
            "#,
            WITH_ZONE
        ))
        .bind(&filters.max_price)
        .bind(&filters.zone_name)
        .bind(filters.accept_mascots)
        .bind(filters.have_parking)
        .bind(filters.min_rooms)
        .bind(filters.min_bathrooms)
        .bind(filters.min_m2)
        .fetch_all(&self.pool)
        .await
    }
}
