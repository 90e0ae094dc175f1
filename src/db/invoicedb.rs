use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::BigDecimal;

use crate::{
    db::db::DBClient,
    models::contractmodel::{Invoice, PaymentHistory, PaymentStatus, TenantLedgerRow},
};

#[async_trait]
pub trait InvoiceExt {
    async fn create_invoice(
        &self,
        contract_id: i64,
        issue_date: NaiveDate,
        total_amount: BigDecimal,
        payment_status: PaymentStatus,
    ) -> Result<Invoice, sqlx::Error>;

    /// Owner of the property the invoice bills for.
    async fn get_invoice_owner(&self, invoice_id: i64) -> Result<Option<i64>, sqlx::Error>;

    async fn get_invoices_for_owner(&self, owner_id: i64) -> Result<Vec<Invoice>, sqlx::Error>;

    async fn get_invoices_for_tenant(&self, tenant_id: i64) -> Result<Vec<Invoice>, sqlx::Error>;

    async fn get_all_invoices(&self) -> Result<Vec<Invoice>, sqlx::Error>;

    async fn update_invoice_status(
        &self,
        invoice_id: i64,
        payment_status: PaymentStatus,
    ) -> Result<Option<Invoice>, sqlx::Error>;

    /// Insert a payment. The invoice flips to Paid once payments cover its total.
    async fn record_payment(
        &self,
        invoice_id: i64,
        payment_date: NaiveDate,
        amount_paid: BigDecimal,
    ) -> Result<Option<(PaymentHistory, Invoice)>, sqlx::Error>;

    async fn get_tenant_ledger(&self, tenant_id: i64) -> Result<Vec<TenantLedgerRow>, sqlx::Error>;
}

#[async_trait]
impl InvoiceExt for DBClient {
    async fn create_invoice(
        &self,
        contract_id: i64,
        issue_date: NaiveDate,
        total_amount: BigDecimal,
        payment_status: PaymentStatus,
    ) -> Result<Invoice, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (contract_id, issue_date, total_amount, payment_status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(contract_id)
        .bind(issue_date)
        .bind(total_amount)
        .bind(payment_status)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_invoice_owner(&self, invoice_id: i64) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT p.owner_user_id
            FROM invoices i
            JOIN contracts c ON c.id = i.contract_id
            JOIN properties p ON p.id = c.property_id
            WHERE i.id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_invoices_for_owner(&self, owner_id: i64) -> Result<Vec<Invoice>, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(
            r#"
            SELECT i.*
            FROM invoices i
            JOIN contracts c ON c.id = i.contract_id
            JOIN properties p ON p.id = c.property_id
            WHERE p.owner_user_id = $1
            ORDER BY i.issue_date DESC, i.id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_invoices_for_tenant(&self, tenant_id: i64) -> Result<Vec<Invoice>, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(
            r#"
            SELECT i.*
            FROM invoices i
            JOIN contracts c ON c.id = i.contract_id
            WHERE c.tenant_user_id = $1
            ORDER BY i.issue_date DESC, i.id DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_all_invoices(&self) -> Result<Vec<Invoice>, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(r#"SELECT * FROM invoices ORDER BY issue_date DESC, id DESC"#)
            .fetch_all(&self.pool)
            .await
    }

    async fn update_invoice_status(
        &self,
        invoice_id: i64,
        payment_status: PaymentStatus,
    ) -> Result<Option<Invoice>, sqlx::Error> {
        sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices SET payment_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(payment_status)
        .fetch_optional(&self.pool)
        .await
    }

    async fn record_payment(
        &self,
        invoice_id: i64,
        payment_date: NaiveDate,
        amount_paid: BigDecimal,
    ) -> Result<Option<(PaymentHistory, Invoice)>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let invoice = sqlx::query_as::<_, Invoice>(r#"SELECT * FROM invoices WHERE id = $1 FOR UPDATE"#)
            .bind(invoice_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(mut invoice) = invoice else {
            return Ok(None);
        };

        let payment = sqlx::query_as::<_, PaymentHistory>(
            r#"
            INSERT INTO payment_histories (invoice_id, payment_date, amount_paid)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(invoice_id)
        .bind(payment_date)
        .bind(amount_paid)
        .fetch_one(&mut *tx)
        .await?;

        let paid = sqlx::query_scalar::<_, BigDecimal>(
            r#"SELECT COALESCE(SUM(amount_paid), 0) FROM payment_histories WHERE invoice_id = $1"#,
        )
        .bind(invoice_id)
        .fetch_one(&mut *tx)
        .await?;

        if paid >= invoice.total_amount && invoice.payment_status != PaymentStatus::Paid {
            invoice = sqlx::query_as::<_, Invoice>(
                r#"
                UPDATE invoices SET payment_status = 'Paid', updated_at = NOW()
                WHERE id = $1
                RETURNING *
                "#,
            )
            .bind(invoice_id)
            .fetch_one(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some((payment, invoice)))
    }

    async fn get_tenant_ledger(&self, tenant_id: i64) -> Result<Vec<TenantLedgerRow>, sqlx::Error> {
        sqlx::query_as::<_, TenantLedgerRow>(
            r#"
            SELECT u.id AS tenant_user_id,
                   CONCAT(u.first_name, ' ', u.last_name) AS tenant_name,
                   c.id AS contract_id,
                   i.id AS invoice_id,
                   i.issue_date AS invoice_date,
                   i.total_amount AS invoice_total,
                   i.payment_status,
                   ph.payment_date,
                   ph.amount_paid
            FROM users u
            JOIN contracts c ON c.tenant_user_id = u.id
            JOIN invoices i ON i.contract_id = c.id
            LEFT JOIN payment_histories ph ON ph.invoice_id = i.id
            WHERE c.tenant_user_id = $1
            ORDER BY i.issue_date DESC, ph.payment_date DESC NULLS LAST
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }
}
