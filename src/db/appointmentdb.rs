use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    db::db::DBClient,
    dtos::applicationdtos::AppointmentListing,
    models::applicationmodel::{Appointment, AppointmentStatus, AppointmentWithUser},
};

const LISTING: &str = r#"
    SELECT a.id, a.property_id, a.user_id, a.requested_date, a.status,
           CONCAT_WS(', ', p.street, p.number, p.city, p.state, p.postal_code) AS property_address,
           u.first_name, u.last_name, u.email
    FROM appointments a
    JOIN properties p ON p.id = a.property_id
    JOIN users u ON u.id = a.user_id
"#;

#[async_trait]
pub trait AppointmentExt {
    async fn create_appointment(
        &self,
        property_id: i64,
        user_id: i64,
        requested_date: DateTime<Utc>,
    ) -> Result<Appointment, sqlx::Error>;

    async fn get_appointments_for_property(
        &self,
        property_id: i64,
    ) -> Result<Vec<AppointmentWithUser>, sqlx::Error>;

    async fn get_appointments_for_user(&self, user_id: i64) -> Result<Vec<AppointmentListing>, sqlx::Error>;

    /// Appointments on the owner's properties. `None` lists every appointment.
    async fn get_appointments_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<AppointmentListing>, sqlx::Error>;

    async fn get_appointment_owner(&self, appointment_id: i64) -> Result<Option<i64>, sqlx::Error>;

    async fn update_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, sqlx::Error>;
}

#[async_trait]
impl AppointmentExt for DBClient {
    async fn create_appointment(
        &self,
        property_id: i64,
        user_id: i64,
        requested_date: DateTime<Utc>,
    ) -> Result<Appointment, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (property_id, user_id, requested_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(property_id)
        .bind(user_id)
        .bind(requested_date)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_appointments_for_property(
        &self,
        property_id: i64,
    ) -> Result<Vec<AppointmentWithUser>, sqlx::Error> {
        sqlx::query_as::<_, AppointmentWithUser>(
            r#"
            SELECT a.requested_date, a.status AS appointment_status,
                   u.id AS user_id, u.first_name, u.last_name, u.email
            FROM appointments a
            JOIN users u ON u.id = a.user_id
            WHERE a.property_id = $1
            ORDER BY a.requested_date ASC
            "#,
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_appointments_for_user(&self, user_id: i64) -> Result<Vec<AppointmentListing>, sqlx::Error> {
        sqlx::query_as::<_, AppointmentListing>(&format!(
            "{} WHERE a.user_id = $1 ORDER BY a.requested_date DESC",
            LISTING
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_appointments_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<AppointmentListing>, sqlx::Error> {
        sqlx::query_as::<_, AppointmentListing>(&format!(
            "{} WHERE ($1::bigint IS NULL OR p.owner_user_id = $1) ORDER BY a.requested_date DESC",
            LISTING
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_appointment_owner(&self, appointment_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT p.owner_user_id
            FROM appointments a
            JOIN properties p ON p.id = a.property_id
            WHERE a.id = $1
            "#,
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(appointment_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }
}
