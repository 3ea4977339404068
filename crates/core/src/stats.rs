//! Order volume over the period the data covers.

use time::{Date, OffsetDateTime};

use crate::model::Order;

/// Count and daily average of orders, optionally for one city.
///
/// Orders without a readable creation time are left out. The period runs
/// from the calendar day (UTC) of the oldest counted order to that of the
/// newest, both inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStats {
    pub total: usize,
    /// Calendar days in the period; 0 when nothing was counted.
    pub days: i64,
    pub daily_average: f64,
    pub first_day: Option<Date>,
    pub last_day: Option<Date>,
}

impl OrderStats {
    pub fn compute(orders: &[Order], city: Option<&str>) -> Self {
        let days: Vec<Date> = orders
            .iter()
            .filter(|order| city.map_or(true, |c| order.fields.city == c))
            .filter_map(|order| creation_day(order.created_at_ms))
            .collect();

        let (Some(first), Some(last)) = (days.iter().min(), days.iter().max()) else {
            return OrderStats {
                total: 0,
                days: 0,
                daily_average: 0.0,
                first_day: None,
                last_day: None,
            };
        };

        let span = (*last - *first).whole_days() + 1;
        OrderStats {
            total: days.len(),
            days: span,
            daily_average: days.len() as f64 / span as f64,
            first_day: Some(*first),
            last_day: Some(*last),
        }
    }
}

/// Calendar day of a creation time; `None` for the unknown-time marker 0.
fn creation_day(created_at_ms: i64) -> Option<Date> {
    if created_at_ms == 0 {
        return None;
    }
    let nanos = i128::from(created_at_ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .map(|at| at.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderFields;
    use time::Month;

    const DAY_MS: i64 = 86_400_000;
    // 2025-03-10T00:00:00Z
    const MARCH_10: i64 = 1_741_564_800_000;

    fn march(day: u8) -> Option<Date> {
        Date::from_calendar_date(2025, Month::March, day).ok()
    }

    fn order(city: &str, created_at_ms: i64) -> Order {
        Order {
            id: format!("{city}-{created_at_ms}"),
            fields: OrderFields {
                city: city.to_string(),
                ..OrderFields::default()
            },
            created_at_ms,
        }
    }

    #[test]
    fn empty_input_has_no_period() {
        let stats = OrderStats::compute(&[], None);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.days, 0);
        assert_eq!(stats.daily_average, 0.0);
        assert_eq!(stats.first_day, None);
    }

    #[test]
    fn single_day_counts_as_one() {
        let orders = [
            order("Curitiba", MARCH_10 + 1_000),
            order("Curitiba", MARCH_10 + DAY_MS - 1),
        ];
        let stats = OrderStats::compute(&orders, None);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.days, 1);
        assert_eq!(stats.daily_average, 2.0);
        assert_eq!(stats.first_day, march(10));
        assert_eq!(stats.last_day, march(10));
    }

    #[test]
    fn multi_day_span_is_inclusive() {
        let orders = [
            order("Curitiba", MARCH_10 + 9 * DAY_MS),
            order("Recife", MARCH_10 + 5 * DAY_MS),
            order("Curitiba", MARCH_10 + 3_600_000),
        ];
        let stats = OrderStats::compute(&orders, None);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.days, 10);
        assert!((stats.daily_average - 0.3).abs() < 1e-9);
        assert_eq!(stats.first_day, march(10));
        assert_eq!(stats.last_day, march(19));
    }

    #[test]
    fn city_filter_and_unknown_times() {
        let orders = [
            order("Curitiba", MARCH_10),
            order("Curitiba", 0),
            order("Recife", MARCH_10 + 2 * DAY_MS),
            order("Curitiba", MARCH_10 + DAY_MS),
        ];
        let stats = OrderStats::compute(&orders, Some("Curitiba"));
        assert_eq!(stats.total, 2);
        assert_eq!(stats.days, 2);
        assert_eq!(stats.daily_average, 1.0);

        let none = OrderStats::compute(&orders, Some("Manaus"));
        assert_eq!(none.total, 0);
        assert_eq!(none.days, 0);
    }
}
