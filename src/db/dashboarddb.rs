use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::BigDecimal;

use super::query_timeout::QueryTimeout;
use crate::{
    db::db::DBClient,
    models::{
        dashboardmodel::{MonthlyIncome, MonthlyOccupancy, OccupancyCounts, OwnerPropertyRow},
        maintenancemodel::MaintenanceRequest,
    },
};

/// Owner dashboard aggregations. Month ranges are half open: `[start, end)`.
#[async_trait]
pub trait DashboardExt {
    async fn get_priority_requests(&self, owner_id: i64) -> Result<Vec<MaintenanceRequest>, sqlx::Error>;

    async fn get_pending_maintenance_cost(
        &self,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BigDecimal, sqlx::Error>;

    async fn get_monthly_income(&self, owner_id: i64) -> Result<Vec<MonthlyIncome>, sqlx::Error>;

    async fn get_monthly_occupancy(&self, owner_id: i64) -> Result<Vec<MonthlyOccupancy>, sqlx::Error>;

    async fn get_occupancy_counts(&self, owner_id: i64) -> Result<OccupancyCounts, sqlx::Error>;

    async fn get_payments_between(
        &self,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BigDecimal, sqlx::Error>;

    async fn get_pending_invoices_between(
        &self,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BigDecimal, sqlx::Error>;

    async fn get_owner_properties_overview(
        &self,
        owner_id: i64,
    ) -> Result<Vec<OwnerPropertyRow>, sqlx::Error>;
}

#[async_trait]
impl DashboardExt for DBClient {
    async fn get_priority_requests(&self, owner_id: i64) -> Result<Vec<MaintenanceRequest>, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_as::<_, MaintenanceRequest>(
                r#"
                SELECT m.*
                FROM maintenance_requests m
                JOIN properties p ON p.id = m.property_id
                WHERE p.owner_user_id = $1
                  AND m.status = 'Pending'
                  AND m.priority = 'High'
                ORDER BY m.priority DESC, m.report_date DESC
                LIMIT 10
                "#,
            )
            .bind(owner_id)
            .fetch_all(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_pending_maintenance_cost(
        &self,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BigDecimal, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_scalar::<_, BigDecimal>(
                r#"
                SELECT COALESCE(SUM(m.maintenance_cost), 0)
                FROM maintenance_requests m
                JOIN properties p ON p.id = m.property_id
                WHERE p.owner_user_id = $1
                  AND m.status = 'Pending'
                  AND m.date_review >= $2 AND m.date_review < $3
                "#,
            )
            .bind(owner_id)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_monthly_income(&self, owner_id: i64) -> Result<Vec<MonthlyIncome>, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_as::<_, MonthlyIncome>(
                r#"
                SELECT EXTRACT(YEAR FROM ph.payment_date)::int AS year,
                       EXTRACT(MONTH FROM ph.payment_date)::int AS month,
                       SUM(ph.amount_paid) AS total_income
                FROM payment_histories ph
                JOIN invoices i ON i.id = ph.invoice_id
                JOIN contracts c ON c.id = i.contract_id
                JOIN properties p ON p.id = c.property_id
                WHERE p.owner_user_id = $1
                  AND ph.amount_paid IS NOT NULL
                GROUP BY 1, 2
                ORDER BY 1 ASC, 2 ASC
                "#,
            )
            .bind(owner_id)
            .fetch_all(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_monthly_occupancy(&self, owner_id: i64) -> Result<Vec<MonthlyOccupancy>, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_as::<_, MonthlyOccupancy>(
                r#"
                SELECT COUNT(*) FILTER (WHERE availability = 'Available') AS available,
                       COUNT(*) FILTER (WHERE availability = 'Not Available') AS not_available,
                       EXTRACT(YEAR FROM updated_at)::int AS year,
                       EXTRACT(MONTH FROM updated_at)::int AS month
                FROM properties
                WHERE owner_user_id = $1
                GROUP BY 3, 4
                ORDER BY 3, 4
                "#,
            )
            .bind(owner_id)
            .fetch_all(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_occupancy_counts(&self, owner_id: i64) -> Result<OccupancyCounts, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_as::<_, OccupancyCounts>(
                r#"
                SELECT COUNT(*) AS total,
                       COUNT(*) FILTER (WHERE availability = 'Available') AS available,
                       COUNT(*) FILTER (WHERE availability = 'Not Available') AS not_available
                FROM properties
                WHERE owner_user_id = $1
                "#,
            )
            .bind(owner_id)
            .fetch_one(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_payments_between(
        &self,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BigDecimal, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_scalar::<_, BigDecimal>(
                r#"
                SELECT COALESCE(SUM(ph.amount_paid), 0)
                FROM payment_histories ph
                JOIN invoices i ON i.id = ph.invoice_id
                JOIN contracts c ON c.id = i.contract_id
                JOIN properties p ON p.id = c.property_id
                WHERE p.owner_user_id = $1
                  AND ph.amount_paid IS NOT NULL
                  AND ph.payment_date >= $2 AND ph.payment_date < $3
                "#,
            )
            .bind(owner_id)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_pending_invoices_between(
        &self,
        owner_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BigDecimal, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_scalar::<_, BigDecimal>(
                r#"
                SELECT COALESCE(SUM(i.total_amount), 0)
                FROM invoices i
                JOIN contracts c ON c.id = i.contract_id
                JOIN properties p ON p.id = c.property_id
                WHERE p.owner_user_id = $1
                  AND i.payment_status = 'Pending'
                  AND i.issue_date >= $2 AND i.issue_date < $3
                "#,
            )
            .bind(owner_id)
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }

    async fn get_owner_properties_overview(
        &self,
        owner_id: i64,
    ) -> Result<Vec<OwnerPropertyRow>, sqlx::Error> {
        QueryTimeout::execute_with_timeout(
            sqlx::query_as::<_, OwnerPropertyRow>(
                r#"
                SELECT p.id AS property_id,
                       CONCAT_WS(', ', p.street, p.number, p.city, p.state, p.postal_code) AS property_address,
                       CASE WHEN u.id IS NULL THEN NULL
                            ELSE CONCAT(u.first_name, ' ', u.last_name) END AS tenant_name,
                       c.rental_amount,
                       c.end_date AS contract_end,
                       c.status AS contract_status
                FROM properties p
                LEFT JOIN contracts c ON c.property_id = p.id
                LEFT JOIN users u ON u.id = c.tenant_user_id
                WHERE p.owner_user_id = $1
                  AND (c.status IN ('Active', 'Pending Renewal', 'Terminated') OR c.status IS NULL)
                ORDER BY p.id, c.end_date DESC
                "#,
            )
            .bind(owner_id)
            .fetch_all(&self.pool),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await
    }
}
