use async_trait::async_trait;

use crate::{db::db::DBClient, models::notificationmodel::Notification};

#[async_trait]
pub trait NotificationExt {
    async fn create_notification(
        &self,
        sender_id: i64,
        receiver_id: i64,
        notification_type: &str,
        message: &str,
    ) -> Result<Notification, sqlx::Error>;

    async fn get_notification(&self, notification_id: i64) -> Result<Option<Notification>, sqlx::Error>;

    async fn get_notifications_for_receiver(&self, receiver_id: i64) -> Result<Vec<Notification>, sqlx::Error>;

    async fn set_read_status(
        &self,
        notification_id: i64,
        read_status: bool,
    ) -> Result<Option<Notification>, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        sender_id: i64,
        receiver_id: i64,
        notification_type: &str,
        message: &str,
    ) -> Result<Notification, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (sender_id, receiver_id, notification_type, message, sent_date, read_status)
            VALUES ($1, $2, $3, $4, NOW(), FALSE)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(notification_type)
        .bind(message)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_notification(&self, notification_id: i64) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(r#"SELECT * FROM notifications WHERE id = $1"#)
            .bind(notification_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_notifications_for_receiver(&self, receiver_id: i64) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"SELECT * FROM notifications WHERE receiver_id = $1 ORDER BY sent_date DESC, id DESC"#,
        )
        .bind(receiver_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn set_read_status(
        &self,
        notification_id: i64,
        read_status: bool,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"UPDATE notifications SET read_status = $2 WHERE id = $1 RETURNING *"#,
        )
        .bind(notification_id)
        .bind(read_status)
        .fetch_optional(&self.pool)
        .await
    }
}
