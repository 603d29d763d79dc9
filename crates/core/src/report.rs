//! Sales report filters, backend report payloads and daily revenue.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::Order;
use crate::types::date::{format_short, wib_date};
use crate::types::{OrderStatus, Rupiah};

/// Length of the default report window.
pub const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Query for `GET /admin/reports/orders`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFilter {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `None` means `ALL`.
    pub status: Option<OrderStatus>,
}

impl ReportFilter {
    /// The 30 days ending `today`, every status.
    #[must_use]
    pub fn last_30_days(today: NaiveDate) -> Self {
        Self {
            start_date: today
                .checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
                .unwrap_or(today),
            end_date: today,
            status: None,
        }
    }

    /// Build from the report page's query, falling back to the default
    /// window for missing or unparseable dates.
    #[must_use]
    pub fn from_query(
        today: NaiveDate,
        start: Option<&str>,
        end: Option<&str>,
        status: Option<&str>,
    ) -> Self {
        let default = Self::last_30_days(today);
        Self {
            start_date: start.and_then(parse_date).unwrap_or(default.start_date),
            end_date: end.and_then(parse_date).unwrap_or(default.end_date),
            status: status.and_then(|s| s.parse().ok()),
        }
    }

    /// The `status` query value.
    #[must_use]
    pub fn status_param(&self) -> &'static str {
        self.status.map_or("ALL", |s| s.as_str())
    }

    /// Query pairs sent to the backend.
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("startDate", self.start_date.format("%Y-%m-%d").to_string()),
            ("endDate", self.end_date.format("%Y-%m-%d").to_string()),
            ("status", self.status_param().to_string()),
        ]
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Totals computed by the backend for the filtered window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_revenue: Rupiah,
}

/// Response of `GET /admin/reports/orders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub summary: ReportSummary,
}

/// Response of `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_revenue: Rupiah,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_products: u64,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}

/// Revenue booked on one WIB calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    /// `dd/mm/yyyy`.
    pub date: String,
    pub revenue: Rupiah,
}

/// Group revenue-counting orders by creation date, in first-seen order.
#[must_use]
pub fn daily_revenue(orders: &[Order]) -> Vec<DailyRevenue> {
    let mut days: Vec<DailyRevenue> = Vec::new();
    for order in orders.iter().filter(|o| o.status.counts_as_revenue()) {
        let date = format_short(wib_date(&order.created_at));
        match days.iter_mut().find(|day| day.date == date) {
            Some(day) => day.revenue = day.revenue + order.total,
            None => days.push(DailyRevenue {
                date,
                revenue: order.total,
            }),
        }
    }
    days
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::types::OrderId;

    fn order(id: i32, status: OrderStatus, total: i64, at: (u32, u32)) -> Order {
        Order {
            id: OrderId::new(id),
            status,
            payment_method: None,
            total: Rupiah::from_i64(total),
            created_at: Utc.with_ymd_and_hms(2026, 10, at.0, at.1, 0, 0).unwrap(),
            user: None,
            items: Vec::new(),
            courier: None,
            tracking_number: None,
            shipped_at: None,
            payment_proof_url: None,
        }
    }

    #[test]
    fn test_default_window() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let filter = ReportFilter::last_30_days(today);
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2026, 9, 14).unwrap());
        assert_eq!(filter.end_date, today);
        assert_eq!(filter.status_param(), "ALL");
    }

    #[test]
    fn test_from_query_falls_back_per_field() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let filter =
            ReportFilter::from_query(today, Some("2026-10-01"), Some("kemarin"), Some("Selesai"));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(filter.end_date, today);
        assert_eq!(filter.status, Some(OrderStatus::Selesai));
        assert_eq!(filter.query_pairs()[0].1, "2026-10-01");

        let all = ReportFilter::from_query(today, None, None, Some("ALL"));
        assert_eq!(all.status, None);
    }

    #[test]
    fn test_daily_revenue_groups_by_wib_date() {
        let orders = vec![
            order(1, OrderStatus::Selesai, 50_000, (2, 20)),
            order(2, OrderStatus::Dibatalkan, 70_000, (3, 1)),
            order(3, OrderStatus::Diproses, 25_000, (3, 2)),
            order(4, OrderStatus::MenungguPembayaran, 99_000, (3, 3)),
            order(5, OrderStatus::Dikirim, 10_000, (1, 9)),
        ];
        let days = daily_revenue(&orders);
        assert_eq!(
            days,
            vec![
                DailyRevenue {
                    date: "03/10/2026".to_string(),
                    revenue: Rupiah::from_i64(75_000),
                },
                DailyRevenue {
                    date: "01/10/2026".to_string(),
                    revenue: Rupiah::from_i64(10_000),
                },
            ]
        );
    }

    #[test]
    fn test_sales_report_payload() {
        let report: SalesReport = serde_json::from_value(json!({
            "orders": [],
            "summary": { "totalOrders": 4, "totalRevenue": 125000 }
        }))
        .unwrap();
        assert_eq!(report.summary.total_orders, 4);
        assert_eq!(report.summary.total_revenue, Rupiah::from_i64(125_000));
    }
}
