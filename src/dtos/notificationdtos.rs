use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{models::notificationmodel::Notification, service::notification_service::DeliveryOutcome};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendNotificationDto {
    pub receiver_id: i64,
    #[validate(length(min = 1, max = 100, message = "Notification type is required"))]
    pub notification_type: String,
    #[validate(length(min = 1, max = 255, message = "Message is required and may not exceed 255 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub message: String,
    pub data: Notification,
}

#[derive(Debug, Serialize)]
pub struct SendNotificationResponse {
    pub success: bool,
    pub message: String,
    pub data: Notification,
    pub delivery: DeliveryOutcome,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub success: bool,
    pub data: Vec<Notification>,
    pub unread: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_longer_than_255_fails() {
        let dto = SendNotificationDto {
            receiver_id: 4,
            notification_type: "reminder".into(),
            message: "x".repeat(256),
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("message"));
    }

    #[test]
    fn empty_type_fails() {
        let dto = SendNotificationDto {
            receiver_id: 4,
            notification_type: String::new(),
            message: "Rent is due".into(),
        };
        assert!(dto.validate().is_err());
    }
}
