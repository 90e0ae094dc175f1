use async_trait::async_trait;

use crate::{
    db::db::DBClient,
    dtos::maintenancedtos::{MaintenanceListing, UpdateMaintenanceDto},
    models::maintenancemodel::{MaintenancePriority, MaintenanceRequest},
};

const LISTING: &str = r#"
    SELECT m.id, m.property_id, m.tenant_user_id, m.description, m.status, m.priority,
           m.report_date, m.maintenance_cost, m.date_review,
           CONCAT_WS(', ', p.street, p.number, p.city, p.state, p.postal_code) AS property_address,
           CONCAT(u.first_name, ' ', u.last_name) AS tenant_name
    FROM maintenance_requests m
    JOIN properties p ON p.id = m.property_id
    JOIN users u ON u.id = m.tenant_user_id
"#;

#[async_trait]
pub trait MaintenanceExt {
    async fn create_maintenance_request(
        &self,
        property_id: i64,
        tenant_id: i64,
        description: &str,
        priority: MaintenancePriority,
    ) -> Result<MaintenanceRequest, sqlx::Error>;

    async fn get_requests_for_tenant(&self, tenant_id: i64) -> Result<Vec<MaintenanceListing>, sqlx::Error>;

    /// Requests on the owner's properties. `None` lists every request.
    async fn get_requests_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<MaintenanceListing>, sqlx::Error>;

    async fn get_request_owner(&self, request_id: i64) -> Result<Option<i64>, sqlx::Error>;

    async fn update_maintenance_request(
        &self,
        request_id: i64,
        update: UpdateMaintenanceDto,
    ) -> Result<Option<MaintenanceRequest>, sqlx::Error>;
}

#[async_trait]
impl MaintenanceExt for DBClient {
    async fn create_maintenance_request(
        &self,
        property_id: i64,
        tenant_id: i64,
        description: &str,
        priority: MaintenancePriority,
    ) -> Result<MaintenanceRequest, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (property_id, tenant_user_id, description, priority)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(tenant_id)
        .bind(description)
        .bind(priority)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_requests_for_tenant(&self, tenant_id: i64) -> Result<Vec<MaintenanceListing>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceListing>(&format!(
            "{} WHERE m.tenant_user_id = $1 ORDER BY m.report_date DESC, m.id DESC",
            LISTING
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_requests_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<MaintenanceListing>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceListing>(&format!(
            "{} WHERE ($1::bigint IS NULL OR p.owner_user_id = $1) ORDER BY m.priority DESC, m.report_date DESC",
            LISTING
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_request_owner(&self, request_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT p.owner_user_id
            FROM maintenance_requests m
            JOIN properties p ON p.id = m.property_id
            WHERE m.id = $1
            "#,
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_maintenance_request(
        &self,
        request_id: i64,
        update: UpdateMaintenanceDto,
    ) -> Result<Option<MaintenanceRequest>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests
            SET status = COALESCE($2, status),
                priority = COALESCE($3, priority),
                maintenance_cost = COALESCE($4, maintenance_cost),
                date_review = COALESCE($5, date_review),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request_id)
        .bind(update.status)
        .bind(update.priority)
        .bind(update.maintenance_cost)
        .bind(update.date_review)
        .fetch_optional(&self.pool)
        .await
    }
}
