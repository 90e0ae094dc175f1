pub mod applicationmodel;
pub mod commentmodel;
pub mod contractmodel;
pub mod dashboardmodel;
pub mod maintenancemodel;
pub mod notificationmodel;
pub mod propertymodel;
pub mod usermodel;
