use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::BigDecimal};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "contract_status")]
pub enum ContractStatus {
    #[sqlx(rename = "Active")]
    #[serde(rename = "Active")]
    Active,
    #[sqlx(rename = "Pending Renewal")]
    #[serde(rename = "Pending Renewal")]
    PendingRenewal,
    #[sqlx(rename = "Terminated")]
    #[serde(rename = "Terminated")]
    Terminated,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Contract {
    pub id: i64,
    pub tenant_user_id: i64,
    pub property_id: i64,
    pub rental_amount: BigDecimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Contract joined with the property address and the tenant's name.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ContractDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contract: Contract,
    pub property_code: Option<String>,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Invoice {
    pub id: i64,
    pub contract_id: i64,
    pub issue_date: NaiveDate,
    pub total_amount: BigDecimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PaymentHistory {
    pub id: i64,
    pub invoice_id: i64,
    pub payment_date: NaiveDate,
    pub amount_paid: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of a tenant's ledger: an invoice and, when present, one payment against it.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TenantLedgerRow {
    pub tenant_user_id: i64,
    pub tenant_name: String,
    pub contract_id: i64,
    pub invoice_id: i64,
    pub invoice_date: NaiveDate,
    pub invoice_total: BigDecimal,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
    pub amount_paid: Option<BigDecimal>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RentedProperty {
    pub property_id: i64,
    pub property_address: String,
    pub rental_rate: Option<f64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContractStatus,
}
