pub mod applicationdtos;
pub mod contractdtos;
pub mod dashboarddtos;
pub mod maintenancedtos;
pub mod notificationdtos;
pub mod pagedtos;
pub mod propertydtos;
pub mod userdtos;
