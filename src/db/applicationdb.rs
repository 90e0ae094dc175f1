use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    db::db::DBClient,
    dtos::applicationdtos::ApplicationListing,
    models::applicationmodel::{ApplicationStatus, RentalApplication},
};

const LISTING: &str = r#"
    SELECT a.id, a.property_id, a.tenant_user_id, a.application_date, a.status,
           p.property_code,
           CONCAT_WS(', ', p.street, p.number, p.city, p.state, p.postal_code) AS property_address,
           CONCAT(u.first_name, ' ', u.last_name) AS tenant_name,
           u.email AS tenant_email
    FROM rental_applications a
    JOIN properties p ON p.id = a.property_id
    JOIN users u ON u.id = a.tenant_user_id
"#;

#[async_trait]
pub trait ApplicationExt {
    /// Insert-or-reject on (property, tenant). `None` means the tenant already applied.
    async fn create_application(
        &self,
        property_id: i64,
        tenant_id: i64,
        application_date: NaiveDate,
    ) -> Result<Option<i64>, sqlx::Error>;

    async fn get_application(&self, application_id: i64) -> Result<Option<RentalApplication>, sqlx::Error>;

    /// Applications on the owner's properties. `None` lists every application.
    async fn get_applications_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<ApplicationListing>, sqlx::Error>;

    async fn get_applications_for_tenant(
        &self,
        tenant_id: i64,
    ) -> Result<Vec<ApplicationListing>, sqlx::Error>;

    async fn update_application_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<RentalApplication>, sqlx::Error>;
}

#[async_trait]
impl ApplicationExt for DBClient {
    async fn create_application(
        &self,
        property_id: i64,
        tenant_id: i64,
        application_date: NaiveDate,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO rental_applications (property_id, tenant_user_id, application_date, status)
            VALUES ($1, $2, $3, 'Pending')
            ON CONFLICT (property_id, tenant_user_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(property_id)
        .bind(tenant_id)
        .bind(application_date)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_application(&self, application_id: i64) -> Result<Option<RentalApplication>, sqlx::Error> {
        sqlx::query_as::<_, RentalApplication>(r#"SELECT * FROM rental_applications WHERE id = $1"#)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_applications_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<ApplicationListing>, sqlx::Error> {
        sqlx::query_as::<_, ApplicationListing>(&format!(
            "{} WHERE ($1::bigint IS NULL OR p.owner_user_id = $1) ORDER BY a.application_date DESC, a.id DESC",
            LISTING
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_applications_for_tenant(
        &self,
        tenant_id: i64,
    ) -> Result<Vec<ApplicationListing>, sqlx::Error> {
        sqlx::query_as::<_, ApplicationListing>(&format!(
            "{} WHERE a.tenant_user_id = $1 ORDER BY a.application_date DESC, a.id DESC",
            LISTING
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn update_application_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> Result<Option<RentalApplication>, sqlx::Error> {
        sqlx::query_as::<_, RentalApplication>(
            r#"
            UPDATE rental_applications SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(application_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }
}
