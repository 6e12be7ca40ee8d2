//! Owner sales dashboard
//!
//! Aggregates the full order list per branch and per drink for a period.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::models::{Institution, Order, OrderStatus};

/// How many drinks the overall ranking keeps
pub const TOP_DRINKS: usize = 5;

/// Reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Current local calendar day
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    /// Rolling window length; `Day` uses calendar bounds instead
    pub fn days(&self) -> i64 {
        match self {
            Period::Day => 0,
            Period::Week => 7,
            Period::Month => 30,
            Period::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Day => "Today",
            Period::Week => "This Week",
            Period::Month => "This Month",
            Period::Year => "This Year",
        }
    }

    /// Inclusive `[start, end]` window around `now`, in UTC
    pub fn bounds<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let now_utc = now.with_timezone(&Utc);
        match self {
            Period::Day => {
                let tz = now.timezone();
                let day = now.date_naive();
                let start = day
                    .and_hms_opt(0, 0, 0)
                    .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(now_utc);
                let next = day
                    .checked_add_days(Days::new(1))
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(now_utc);
                (start, next - Duration::milliseconds(1))
            }
            other => (now_utc - Duration::days(other.days()), now_utc),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "today" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

/// Sales of one drink (keyed by title)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrinkSales {
    pub name: String,
    pub revenue: Decimal,
    pub quantity: u32,
}

/// Sales of one branch
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionSales {
    pub institution: Institution,
    pub revenue: Decimal,
    pub orders_count: usize,
    /// Best sellers first
    pub drinks: Vec<DrinkSales>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub period: Period,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub institutions: Vec<InstitutionSales>,
    /// Revenue across known branches
    pub total_revenue: Decimal,
    /// Orders in the window, any branch
    pub total_orders: usize,
    pub top_drinks: Vec<DrinkSales>,
    pub status_distribution: BTreeMap<String, usize>,
}

#[derive(Default)]
struct Accumulator {
    revenue: Decimal,
    orders_count: usize,
    drinks: HashMap<String, (Decimal, u32)>,
}

fn ranked(drinks: HashMap<String, (Decimal, u32)>) -> Vec<DrinkSales> {
    let mut ranked: Vec<DrinkSales> = drinks
        .into_iter()
        .map(|(name, (revenue, quantity))| DrinkSales {
            name,
            revenue,
            quantity,
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    ranked
}

impl SalesReport {
    /// Build the report for `period` as seen at `now`.
    ///
    /// Orders still awaiting electronic payment and orders without a
    /// timestamp are left out.
    pub fn build<Tz: TimeZone>(
        orders: &[Order],
        institutions: &[Institution],
        period: Period,
        now: DateTime<Tz>,
    ) -> Self {
        let (start, end) = period.bounds(&now);

        let in_window: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status != OrderStatus::AwaitingPayment)
            .filter(|o| o.created_at.is_some_and(|ts| ts >= start && ts <= end))
            .collect();

        let mut per_branch: HashMap<&str, Accumulator> = institutions
            .iter()
            .map(|inst| (inst.id.as_str(), Accumulator::default()))
            .collect();
        let mut status_distribution = BTreeMap::new();

        for order in &in_window {
            *status_distribution
                .entry(order.status.as_str().to_string())
                .or_insert(0) += 1;

            let Some(acc) = order
                .institution_id
                .as_deref()
                .and_then(|id| per_branch.get_mut(id))
            else {
                continue;
            };
            acc.revenue += order.total_price;
            acc.orders_count += 1;
            for item in &order.items {
                let quantity = item.quantity.max(1);
                let entry = acc.drinks.entry(item.title.clone()).or_default();
                entry.0 += item.price * Decimal::from(quantity);
                entry.1 += quantity;
            }
        }

        let mut overall: HashMap<String, (Decimal, u32)> = HashMap::new();
        let mut total_revenue = Decimal::ZERO;
        let mut branches = Vec::with_capacity(institutions.len());
        for inst in institutions {
            let acc = per_branch.remove(inst.id.as_str()).unwrap_or_default();
            total_revenue += acc.revenue;
            for (name, (revenue, quantity)) in &acc.drinks {
                let entry = overall.entry(name.clone()).or_default();
                entry.0 += *revenue;
                entry.1 += *quantity;
            }
            branches.push(InstitutionSales {
                institution: inst.clone(),
                revenue: acc.revenue,
                orders_count: acc.orders_count,
                drinks: ranked(acc.drinks),
            });
        }

        let mut top_drinks = ranked(overall);
        top_drinks.truncate(TOP_DRINKS);

        tracing::debug!(
            period = %period,
            orders = in_window.len(),
            revenue = %total_revenue,
            "Sales report built"
        );

        Self {
            period,
            start,
            end,
            institutions: branches,
            total_revenue,
            total_orders: in_window.len(),
            top_drinks,
            status_distribution,
        }
    }

    /// Revenue per order, two decimals; zero without orders
    pub fn average_order_value(&self) -> Decimal {
        if self.total_orders == 0 {
            return Decimal::ZERO;
        }
        (self.total_revenue / Decimal::from(self.total_orders)).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn institution(id: &str, name: &str) -> Institution {
        Institution {
            id: id.into(),
            name: name.into(),
            code: name[..2].to_uppercase(),
        }
    }

    fn order(inst: &str, status: &str, created_at: &str, total: i64, items: serde_json::Value) -> Order {
        serde_json::from_value(serde_json::json!({
            "_id": format!("{inst}-{created_at}"),
            "status": status,
            "totalPrice": total,
            "createdAt": created_at,
            "institutionId": inst,
            "items": items,
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2025-03-15T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_day_bounds_follow_local_calendar() {
        let cairo = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = now().with_timezone(&cairo);
        let (start, end) = Period::Day.bounds(&now);
        assert_eq!(start, "2025-03-14T22:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(end, "2025-03-15T21:59:59.999Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_rolling_bounds() {
        let (start, end) = Period::Week.bounds(&now());
        assert_eq!(end, now());
        assert_eq!(start, "2025-03-08T12:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(Period::default(), Period::Month);
        assert_eq!("year".parse::<Period>().unwrap().days(), 365);
    }

    #[test]
    fn test_report_aggregation() {
        let institutions = vec![institution("i1", "maadi"), institution("i2", "zamalek")];
        let orders = vec![
            order(
                "i1",
                "completed",
                "2025-03-15T08:00:00Z",
                110,
                serde_json::json!([
                    {"title": "Latte", "price": 45, "quantity": 2},
                    {"title": "Tea", "price": 20}
                ]),
            ),
            order(
                "i2",
                "paid",
                "2025-03-14T08:00:00Z",
                45,
                serde_json::json!([{"title": "Latte", "price": 45, "quantity": 1}]),
            ),
            // Excluded: awaiting electronic payment
            order(
                "i1",
                "awaiting_payment",
                "2025-03-15T09:00:00Z",
                500,
                serde_json::json!([{"title": "Mocha", "price": 500}]),
            ),
            // Excluded: outside the week
            order(
                "i1",
                "completed",
                "2025-02-01T09:00:00Z",
                70,
                serde_json::json!([{"title": "Mocha", "price": 70}]),
            ),
            // Counted in totals, unknown branch
            order("ghost", "cancelled", "2025-03-15T10:00:00Z", 30, serde_json::json!([])),
        ];

        let report = SalesReport::build(&orders, &institutions, Period::Week, now());

        assert_eq!(report.total_orders, 3);
        assert_eq!(report.total_revenue, Decimal::from(155));
        assert_eq!(report.institutions[0].revenue, Decimal::from(110));
        assert_eq!(report.institutions[0].orders_count, 1);
        assert_eq!(report.institutions[1].revenue, Decimal::from(45));

        assert_eq!(report.top_drinks.len(), 2);
        assert_eq!(report.top_drinks[0].name, "Latte");
        assert_eq!(report.top_drinks[0].revenue, Decimal::from(135));
        assert_eq!(report.top_drinks[0].quantity, 3);
        assert_eq!(report.top_drinks[1].quantity, 1);

        assert_eq!(report.status_distribution.get("completed"), Some(&1));
        assert_eq!(report.status_distribution.get("cancelled"), Some(&1));
        assert!(!report.status_distribution.contains_key("awaiting_payment"));

        assert_eq!(report.average_order_value(), Decimal::new(5167, 2));
    }

    #[test]
    fn test_empty_report() {
        let report = SalesReport::build(&[], &[], Period::Day, now());
        assert_eq!(report.total_orders, 0);
        assert_eq!(report.average_order_value(), Decimal::ZERO);
        assert!(report.top_drinks.is_empty());
    }
}
