use async_trait::async_trait;

use crate::{
    db::db::DBClient,
    dtos::contractdtos::CreateContractDto,
    models::contractmodel::{Contract, ContractDetails, ContractStatus, RentedProperty},
};

const DETAILS: &str = r#"
    SELECT c.*,
           p.property_code,
           CONCAT_WS(', ', p.street, p.number, p.city, p.state, p.postal_code) AS property_address,
           CONCAT(u.first_name, ' ', u.last_name) AS tenant_name,
           u.email AS tenant_email
    FROM contracts c
    JOIN properties p ON p.id = c.property_id
    JOIN users u ON u.id = c.tenant_user_id
"#;

/// A tenant's contracts, the one ending soonest first.
fn tenant_contracts_query() -> String {
    format!(
        "{} WHERE c.tenant_user_id = $1 ORDER BY c.end_date ASC, c.id ASC",
        DETAILS
    )
}

#[async_trait]
pub trait ContractExt {
    async fn create_contract(&self, contract: CreateContractDto) -> Result<Contract, sqlx::Error>;

    async fn get_contract(&self, contract_id: i64) -> Result<Option<Contract>, sqlx::Error>;

    /// Contracts on the owner's properties. `None` lists every contract.
    async fn get_contracts_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<ContractDetails>, sqlx::Error>;

    async fn get_contracts_for_tenant(
        &self,
        tenant_id: i64,
    ) -> Result<Vec<ContractDetails>, sqlx::Error>;

    async fn get_rented_property(
        &self,
        tenant_id: i64,
    ) -> Result<Option<RentedProperty>, sqlx::Error>;

    async fn has_active_contract(&self, tenant_id: i64, property_id: i64) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl ContractExt for DBClient {
    async fn create_contract(&self, contract: CreateContractDto) -> Result<Contract, sqlx::Error> {
        sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (tenant_user_id, property_id, rental_amount, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(contract.tenant_user_id)
        .bind(contract.property_id)
        .bind(&contract.rental_amount)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status.unwrap_or(ContractStatus::Active))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_contract(&self, contract_id: i64) -> Result<Option<Contract>, sqlx::Error> {
        sqlx::query_as::<_, Contract>(r#"SELECT * FROM contracts WHERE id = $1"#)
            .bind(contract_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_contracts_for_owner(
        &self,
        owner_id: Option<i64>,
    ) -> Result<Vec<ContractDetails>, sqlx::Error> {
        sqlx::query_as::<_, ContractDetails>(&format!(
            "{} WHERE ($1::bigint IS NULL OR p.owner_user_id = $1) ORDER BY c.start_date DESC, c.id DESC",
            DETAILS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_contracts_for_tenant(
        &self,
        tenant_id: i64,
    ) -> Result<Vec<ContractDetails>, sqlx::Error> {
        sqlx::query_as::<_, ContractDetails>(&tenant_contracts_query())
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_rented_property(
        &self,
        tenant_id: i64,
    ) -> Result<Option<RentedProperty>, sqlx::Error> {
        sqlx::query_as::<_, RentedProperty>(
            r#"
            SELECT p.id AS property_id,
                   CONCAT_WS(', ', p.street, p.number, p.city, p.state, p.postal_code) AS property_address,
                   p.rental_rate,
                   c.start_date,
                   c.end_date,
                   c.status
            FROM contracts c
            JOIN properties p ON p.id = c.property_id
            WHERE c.tenant_user_id = $1 AND c.status = 'Active'
            ORDER BY c.start_date DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn has_active_contract(&self, tenant_id: i64, property_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contracts
                WHERE tenant_user_id = $1 AND property_id = $2 AND status = 'Active'
            )
            "#,
        )
        .bind(tenant_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_contracts_end_soonest_first() {
        let query = tenant_contracts_query();
        assert!(query.contains("c.tenant_user_id = $1"));
        assert!(query.trim_end().ends_with("ORDER BY c.end_date ASC, c.id ASC"));
    }
}
