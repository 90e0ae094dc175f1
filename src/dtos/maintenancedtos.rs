use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use validator::{Validate, ValidationError};

use crate::models::maintenancemodel::{MaintenancePriority, MaintenanceStatus};

fn validate_cost(value: &BigDecimal) -> Result<(), ValidationError> {
    if *value < BigDecimal::from(0) {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMaintenanceDto {
    pub property_id: i64,
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,
    pub priority: Option<MaintenancePriority>,
}

/// Owner-side update. Fields left out keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMaintenanceDto {
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<MaintenancePriority>,
    #[validate(custom = "validate_cost")]
    pub maintenance_cost: Option<BigDecimal>,
    pub date_review: Option<NaiveDate>,
}

/// Maintenance request with the address of its property.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct MaintenanceListing {
    pub id: i64,
    pub property_id: i64,
    pub tenant_user_id: i64,
    pub description: String,
    pub status: MaintenanceStatus,
    pub priority: MaintenancePriority,
    pub report_date: NaiveDate,
    pub maintenance_cost: Option<BigDecimal>,
    pub date_review: Option<NaiveDate>,
    pub property_address: String,
    pub tenant_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn in_progress_status_deserializes() {
        let dto: UpdateMaintenanceDto = serde_json::from_value(json!({
            "status": "In Progress",
            "maintenance_cost": "150.00",
            "date_review": "2024-06-12"
        }))
        .unwrap();
        assert_eq!(dto.status, Some(MaintenanceStatus::InProgress));
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn negative_cost_is_rejected() {
        let dto = UpdateMaintenanceDto {
            maintenance_cost: Some(BigDecimal::from(-1)),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }
}
