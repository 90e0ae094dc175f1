pub mod background_jobs;
pub mod dashboard_service;
pub mod error;
pub mod notification_service;
pub mod property_service;
