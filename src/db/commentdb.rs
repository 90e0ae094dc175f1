use async_trait::async_trait;

use crate::{
    db::db::DBClient,
    models::commentmodel::CommentWithAuthor,
    service::property_service::average_rating,
};

const WITH_AUTHOR: &str = r#"
    SELECT c.*, u.first_name, u.last_name
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

/// Serializes rating recomputes per property.
const LOCK_PROPERTY: &str = r#"SELECT id FROM properties WHERE id = $1 FOR UPDATE"#;

#[async_trait]
pub trait CommentExt {
    /// Comments for many properties in one round trip, newest first.
    async fn get_comments_for_properties(
        &self,
        property_ids: &[i64],
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error>;

    async fn get_comments_for_property(
        &self,
        property_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error>;

    /// Insert a comment and refresh the property's mean rating atomically.
    async fn create_comment(
        &self,
        property_id: i64,
        user_id: i64,
        comment: &str,
        comment_rate: i32,
    ) -> Result<Option<f64>, sqlx::Error>;
}

#[async_trait]
impl CommentExt for DBClient {
    async fn get_comments_for_properties(
        &self,
        property_ids: &[i64],
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.property_id = ANY($1) ORDER BY c.created_at DESC, c.id DESC",
            WITH_AUTHOR
        ))
        .bind(property_ids.to_vec())
        .fetch_all(&self.pool)
        .await
    }

    async fn get_comments_for_property(
        &self,
        property_id: i64,
    ) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
        sqlx::query_as::<_, CommentWithAuthor>(&format!(
            "{} WHERE c.property_id = $1 ORDER BY c.created_at DESC, c.id DESC",
            WITH_AUTHOR
        ))
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_comment(
        &self,
        property_id: i64,
        user_id: i64,
        comment: &str,
        comment_rate: i32,
    ) -> Result<Option<f64>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(LOCK_PROPERTY)
            .bind(property_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO comments (property_id, user_id, comment, comment_rate)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(property_id)
        .bind(user_id)
        .bind(comment)
        .bind(comment_rate)
        .execute(&mut *tx)
        .await?;

        let ratings = sqlx::query_scalar::<_, i32>(
            r#"SELECT comment_rate FROM comments WHERE property_id = $1"#,
        )
        .bind(property_id)
        .fetch_all(&mut *tx)
        .await?;

        let rating = average_rating(&ratings);

        sqlx::query(r#"UPDATE properties SET rental_rate = $2, updated_at = NOW() WHERE id = $1"#)
            .bind(property_id)
            .bind(rating)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_recompute_locks_the_property_row() {
        let lock = LOCK_PROPERTY.to_uppercase();
        assert!(lock.contains("FROM PROPERTIES"));
        assert!(lock.trim_end().ends_with("FOR UPDATE"));
    }
}
