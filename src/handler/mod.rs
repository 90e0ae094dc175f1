pub mod applications;
pub mod appointments;
pub mod auth;
pub mod comments;
pub mod contracts;
pub mod dashboard;
pub mod invoices;
pub mod maintenance;
pub mod notifications;
pub mod pages;
pub mod payments;
pub mod properties;
pub mod users;
pub mod zones;
