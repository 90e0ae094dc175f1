use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use validator::{Validate, ValidationError};

use crate::models::contractmodel::{ContractStatus, PaymentStatus};

fn validate_positive(value: &BigDecimal) -> Result<(), ValidationError> {
    if *value <= BigDecimal::from(0) {
        return Err(ValidationError::new("must_be_positive"));
    }
    Ok(())
}

fn validate_contract_dates(dto: &CreateContractDto) -> Result<(), ValidationError> {
    if dto.end_date < dto.start_date {
        let mut err = ValidationError::new("end_before_start");
        err.message = Some("The end date must be a date after or equal to the start date".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_contract_dates"))]
pub struct CreateContractDto {
    pub tenant_user_id: i64,
    pub property_id: i64,
    #[validate(custom = "validate_positive")]
    pub rental_amount: BigDecimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<ContractStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInvoiceDto {
    pub contract_id: i64,
    /// Defaults to today.
    pub issue_date: Option<NaiveDate>,
    #[validate(custom = "validate_positive")]
    pub total_amount: BigDecimal,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInvoiceStatusDto {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordPaymentDto {
    pub invoice_id: i64,
    pub payment_date: Option<NaiveDate>,
    #[validate(custom = "validate_positive")]
    pub amount_paid: BigDecimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_date_may_equal_start_date() {
        let dto: CreateContractDto = serde_json::from_value(json!({
            "tenant_user_id": 2,
            "property_id": 9,
            "rental_amount": "8500.00",
            "start_date": "2024-05-01",
            "end_date": "2024-05-01"
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.status, None);
    }

    #[test]
    fn end_date_before_start_is_rejected() {
        let dto: CreateContractDto = serde_json::from_value(json!({
            "tenant_user_id": 2,
            "property_id": 9,
            "rental_amount": 8500,
            "start_date": "2024-05-01",
            "end_date": "2024-04-30",
            "status": "Pending Renewal"
        }))
        .unwrap();
        assert_eq!(dto.status, Some(ContractStatus::PendingRenewal));
        assert!(dto.validate().is_err());
    }

    #[test]
    fn payments_must_be_positive() {
        let dto = RecordPaymentDto {
            invoice_id: 1,
            payment_date: None,
            amount_paid: BigDecimal::from(0),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount_paid"));
    }
}
