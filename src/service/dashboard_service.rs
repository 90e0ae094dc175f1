use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use sqlx::types::BigDecimal;

use crate::{
    db::{dashboarddb::DashboardExt, db::DBClient},
    dtos::dashboarddtos::{CardStat, DashboardProps},
    models::{dashboardmodel::OccupancyCounts, usermodel::User},
    service::error::ServiceError,
    utils::currency::format_usd,
};

/// First day of the month containing `today` and first day of the next month.
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let (year, month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(start);
    (start, end)
}

/// Share of the owner's properties that are Not Available, in percent.
pub fn occupancy_rate(counts: &OccupancyCounts) -> f64 {
    if counts.total == 0 {
        return 0.0;
    }
    let rate = counts.not_available as f64 / counts.total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

pub fn build_card_stats(
    counts: &OccupancyCounts,
    rate: f64,
    estimated_income: &BigDecimal,
    maintenance_cost: &BigDecimal,
) -> Vec<CardStat> {
    let card = |subtitle: &str, title: String, icon: &str, color: &str| CardStat {
        stat_subtitle: subtitle.to_string(),
        stat_title: title,
        stat_icon_name: icon.to_string(),
        stat_icon_color: color.to_string(),
    };

    vec![
        card(
            "Active Properties",
            format!("{} of {}", counts.available, counts.total),
            "mdi mdi-home",
            "bg-blue-500",
        ),
        card(
            "Occupancy Rate",
            format!("{}%", rate),
            "mdi mdi-chart-line",
            "bg-green-500",
        ),
        card(
            "Estimated Income",
            format_usd(estimated_income),
            "mdi mdi-currency-usd",
            "bg-yellow-500",
        ),
        card(
            "Maintenance Payments",
            format_usd(maintenance_cost),
            "mdi mdi-currency-usd-off",
            "bg-red-500",
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    db_client: Arc<DBClient>,
}

impl DashboardService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn owner_dashboard(
        &self,
        owner: &User,
        today: NaiveDate,
        child_component: &str,
    ) -> Result<DashboardProps, ServiceError> {
        let db = &self.db_client;
        let (start, end) = month_bounds(today);

        let (requests, maintenance_cost, monthly_income, occupancy_data, counts, paid, pending, properties_data) =
            tokio::try_join!(
                db.get_priority_requests(owner.id),
                db.get_pending_maintenance_cost(owner.id, start, end),
                db.get_monthly_income(owner.id),
                db.get_monthly_occupancy(owner.id),
                db.get_occupancy_counts(owner.id),
                db.get_payments_between(owner.id, start, end),
                db.get_pending_invoices_between(owner.id, start, end),
                db.get_owner_properties_overview(owner.id),
            )?;

        let estimated_income = paid + pending;
        let rate = occupancy_rate(&counts);

        tracing::debug!(
            "Dashboard for owner {}: {} properties, occupancy {}%",
            owner.id,
            counts.total,
            rate
        );

        Ok(DashboardProps {
            requests,
            monthly_income,
            occupancy_data,
            card_stats: build_card_stats(&counts, rate, &estimated_income, &maintenance_cost),
            properties_data,
            child_component: child_component.to_string(),
            user: owner.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn one_of_four_unavailable_is_25_percent() {
        let counts = OccupancyCounts { total: 4, available: 3, not_available: 1 };
        assert_eq!(occupancy_rate(&counts), 25.0);
        assert_eq!(format!("{}%", occupancy_rate(&counts)), "25%");
    }

    #[test]
    fn no_properties_means_zero_rate() {
        assert_eq!(occupancy_rate(&OccupancyCounts::default()), 0.0);
    }

    #[test]
    fn rate_is_rounded_to_two_decimals() {
        let counts = OccupancyCounts { total: 3, available: 2, not_available: 1 };
        assert_eq!(occupancy_rate(&counts), 33.33);
    }

    #[test]
    fn month_bounds_roll_over_december() {
        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2024, 12, 17).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let (start, end) = month_bounds(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn card_stats_keep_order_and_format() {
        let counts = OccupancyCounts { total: 4, available: 3, not_available: 1 };
        let cards = build_card_stats(
            &counts,
            25.0,
            &BigDecimal::from_str("12500.5").unwrap(),
            &BigDecimal::from(0),
        );

        let titles: Vec<&str> = cards.iter().map(|c| c.stat_title.as_str()).collect();
        assert_eq!(titles, vec!["3 of 4", "25%", "$12,500.50", "$0.00"]);
        assert_eq!(cards[0].stat_subtitle, "Active Properties");
        assert_eq!(cards[3].stat_icon_color, "bg-red-500");

        let value = serde_json::to_value(&cards[1]).unwrap();
        assert_eq!(value["statSubtitle"], "Occupancy Rate");
        assert_eq!(value["statIconName"], "mdi mdi-chart-line");
    }
}
