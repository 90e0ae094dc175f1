use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::BigDecimal};

use crate::models::contractmodel::ContractStatus;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MonthlyIncome {
    pub year: i32,
    pub month: i32,
    pub total_income: BigDecimal,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MonthlyOccupancy {
    pub available: i64,
    pub not_available: i64,
    pub year: i32,
    pub month: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct OwnerPropertyRow {
    pub property_id: i64,
    pub property_address: String,
    pub tenant_name: Option<String>,
    pub rental_amount: Option<BigDecimal>,
    pub contract_end: Option<NaiveDate>,
    pub contract_status: Option<ContractStatus>,
}

/// Property counts for one owner.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccupancyCounts {
    pub total: i64,
    pub available: i64,
    pub not_available: i64,
}
