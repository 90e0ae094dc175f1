use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    applicationmodel::{ApplicationStatus, AppointmentStatus, AppointmentWithUser, RentalApplication},
    usermodel::UserSummary,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplicationDto {
    pub property_id: i64,
    pub application_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationCreatedResponse {
    pub message: String,
    pub application: i64,
    pub status: u16,
}

/// Application as listed to owners and tenants, with the property and applicant.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct ApplicationListing {
    pub id: i64,
    pub property_id: i64,
    pub tenant_user_id: i64,
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    pub property_code: Option<String>,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationDecisionResponse {
    pub status: &'static str,
    pub message: String,
    pub application: RentalApplication,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentDto {
    pub property_id: i64,
    pub requested_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusDto {
    pub status: AppointmentStatus,
}

/// Appointment with its property, for the tenant and owner listings.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct AppointmentListing {
    pub id: i64,
    pub property_id: i64,
    pub user_id: i64,
    pub requested_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub property_address: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommentDto {
    pub property_id: i64,
    #[validate(length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"))]
    pub comment: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub comment_rate: i32,
}

/// Appointment entry of the property details page.
#[derive(Debug, Serialize)]
pub struct DetailsAppointment {
    pub requested_date: DateTime<Utc>,
    pub appointment_status: AppointmentStatus,
    pub user: UserSummary,
}

impl From<AppointmentWithUser> for DetailsAppointment {
    fn from(row: AppointmentWithUser) -> Self {
        DetailsAppointment {
            requested_date: row.requested_date,
            appointment_status: row.appointment_status,
            user: UserSummary {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rating_outside_one_to_five_fails() {
        for rate in [0, 6] {
            let dto = CreateCommentDto {
                property_id: 1,
                comment: "Nice".into(),
                comment_rate: rate,
            };
            assert!(dto.validate().is_err(), "rate {} should fail", rate);
        }
    }

    #[test]
    fn appointment_status_uses_plain_labels() {
        let dto: UpdateAppointmentStatusDto =
            serde_json::from_value(json!({ "status": "Confirmed" })).unwrap();
        assert_eq!(dto.status, AppointmentStatus::Confirmed);
    }
}
