use async_trait::async_trait;

use super::db::DBClient;
use crate::models::propertymodel::Zone;

#[async_trait]
pub trait ZoneExt {
    async fn get_zones(&self) -> Result<Vec<Zone>, sqlx::Error>;

    async fn zone_exists(&self, zone_id: i64) -> Result<bool, sqlx::Error>;
}

#[async_trait]
impl ZoneExt for DBClient {
    async fn get_zones(&self) -> Result<Vec<Zone>, sqlx::Error> {
        sqlx::query_as::<_, Zone>(r#"SELECT id, name FROM zones ORDER BY name"#)
            .fetch_all(&self.pool)
            .await
    }

    async fn zone_exists(&self, zone_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS(SELECT 1 FROM zones WHERE id = $1)"#)
            .bind(zone_id)
            .fetch_one(&self.pool)
            .await
    }
}
