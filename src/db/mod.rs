pub mod applicationdb;
pub mod appointmentdb;
pub mod commentdb;
pub mod contractdb;
pub mod dashboarddb;
pub mod db;
pub mod invoicedb;
pub mod maintenancedb;
pub mod notificationdb;
pub mod propertydb;
pub mod query_timeout;
pub mod userdb;
pub mod zonedb;
