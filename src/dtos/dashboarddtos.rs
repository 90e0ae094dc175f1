use serde::Serialize;

use crate::models::{
    dashboardmodel::{MonthlyIncome, MonthlyOccupancy, OwnerPropertyRow},
    maintenancemodel::MaintenanceRequest,
    usermodel::User,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardStat {
    pub stat_subtitle: String,
    pub stat_title: String,
    pub stat_icon_name: String,
    pub stat_icon_color: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardProps {
    pub requests: Vec<MaintenanceRequest>,
    pub monthly_income: Vec<MonthlyIncome>,
    pub occupancy_data: Vec<MonthlyOccupancy>,
    pub card_stats: Vec<CardStat>,
    pub properties_data: Vec<OwnerPropertyRow>,
    pub child_component: String,
    pub user: User,
}
