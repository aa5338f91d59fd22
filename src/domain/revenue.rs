use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Cents, OrderId, PaymentId};

/// A payment as seen by the revenue aggregation: the persisted payment joined
/// with the amount (and name) of its parent order. Read-only input, fetched
/// fresh for every aggregation.
///
/// `order_name` is display metadata only; no aggregation rule looks at it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub planned_amount: Option<Cents>,
    /// Share of `order_amount`, 0-100.
    pub planned_amount_percent: Option<f64>,
    pub planned_date: Option<NaiveDate>,
    pub actual_amount: Option<Cents>,
    pub actual_date: Option<NaiveDate>,
    pub order_amount: Option<Cents>,
    pub order_name: Option<String>,
}

impl PaymentRecord {
    /// True when the actual side counts as realized revenue: a realization
    /// date plus a strictly positive amount.
    pub fn is_realized(&self) -> bool {
        self.actual_date.is_some() && self.actual_amount.unwrap_or(0) > 0
    }
}

/// Calendar month a contribution lands in. Ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Planned and realized revenue accumulated for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthBucket {
    pub key: MonthKey,
    pub planned: Cents,
    pub actual: Cents,
}

impl MonthBucket {
    fn empty(key: MonthKey) -> Self {
        Self {
            key,
            planned: 0,
            actual: 0,
        }
    }

    /// English month label, e.g. "March 2024". Anything fancier than this
    /// (locale, currency) belongs to the presentation layer.
    pub fn label(&self) -> String {
        let name = MONTH_NAMES[(self.key.month as usize - 1).min(11)];
        format!("{} {}", name, self.key.year)
    }
}

/// Planned-vs-actual revenue per month, newest month first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub months: Vec<MonthBucket>,
}

impl RevenueSummary {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn total_actual(&self) -> Cents {
        self.months.iter().map(|b| b.actual).sum()
    }

    pub fn total_planned(&self) -> Cents {
        self.months.iter().map(|b| b.planned).sum()
    }
}

/// Resolve the planned amount of a record to cents.
///
/// An absolute plan wins; a percentage plan needs the order amount to resolve
/// and rounds to the nearest cent; anything else contributes nothing.
pub fn resolve_planned_amount(record: &PaymentRecord) -> Cents {
    if let Some(amount) = record.planned_amount {
        return amount;
    }
    match (record.planned_amount_percent, record.order_amount) {
        (Some(percent), Some(order_amount)) => {
            (order_amount as f64 * percent / 100.0).round() as Cents
        }
        _ => 0,
    }
}

/// Bucket planned and realized revenue by calendar month.
///
/// A record's planned side lands in the month of its planned date, its actual
/// side in the month of its actual date; the two months may differ, so a
/// single record can feed two buckets. Months nothing contributed to never
/// appear. Records missing a date or an amount on one side simply skip that
/// side; a defective record can never abort the summary.
pub fn aggregate_by_month(records: &[PaymentRecord]) -> RevenueSummary {
    let mut buckets: std::collections::HashMap<MonthKey, MonthBucket> =
        std::collections::HashMap::new();

    for record in records {
        let planned = resolve_planned_amount(record);
        if planned > 0 {
            if let Some(date) = record.planned_date {
                let key = MonthKey::from_date(date);
                buckets
                    .entry(key)
                    .or_insert_with(|| MonthBucket::empty(key))
                    .planned += planned;
            }
        }

        if record.is_realized() {
            if let (Some(amount), Some(date)) = (record.actual_amount, record.actual_date) {
                let key = MonthKey::from_date(date);
                buckets
                    .entry(key)
                    .or_insert_with(|| MonthBucket::empty(key))
                    .actual += amount;
            }
        }
    }

    let mut months: Vec<MonthBucket> = buckets.into_values().collect();
    months.sort_by(|a, b| b.key.cmp(&a.key));

    RevenueSummary { months }
}

/// Sum of realized payment amounts. Always equals the sum of `actual` over the
/// buckets of [`aggregate_by_month`], but needs no bucketing.
pub fn total_realized_revenue(records: &[PaymentRecord]) -> Cents {
    records
        .iter()
        .filter(|r| r.is_realized())
        .filter_map(|r| r.actual_amount)
        .sum()
}

/// The `limit` most recently realized payments, newest first.
///
/// Records sharing an actual date are ordered by id so the result does not
/// depend on how the input happened to be ordered.
pub fn recent_realized_payments(records: &[PaymentRecord], limit: usize) -> Vec<PaymentRecord> {
    let mut realized: Vec<PaymentRecord> = records
        .iter()
        .filter(|r| r.is_realized())
        .cloned()
        .collect();

    realized.sort_by(|a, b| b.actual_date.cmp(&a.actual_date).then(a.id.cmp(&b.id)));
    realized.truncate(limit);
    realized
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record() -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            planned_amount: None,
            planned_amount_percent: None,
            planned_date: None,
            actual_amount: None,
            actual_date: None,
            order_amount: None,
            order_name: None,
        }
    }

    #[test]
    fn test_resolve_planned_absolute_wins() {
        let mut r = record();
        r.planned_amount = Some(100000);
        r.planned_amount_percent = Some(50.0);
        r.order_amount = Some(400000);
        assert_eq!(resolve_planned_amount(&r), 100000);
    }

    #[test]
    fn test_resolve_planned_percent_of_order() {
        let mut r = record();
        r.planned_amount_percent = Some(50.0);
        r.order_amount = Some(200000);
        assert_eq!(resolve_planned_amount(&r), 100000);
    }

    #[test]
    fn test_resolve_planned_percent_without_order_amount() {
        let mut r = record();
        r.planned_amount_percent = Some(50.0);
        assert_eq!(resolve_planned_amount(&r), 0);
    }

    #[test]
    fn test_resolve_planned_nothing_set() {
        assert_eq!(resolve_planned_amount(&record()), 0);
    }

    #[test]
    fn test_single_planned_payment_makes_one_bucket() {
        let mut r = record();
        r.planned_amount = Some(100000);
        r.planned_date = Some(date("2024-01-15"));

        let summary = aggregate_by_month(&[r]);
        assert_eq!(summary.months.len(), 1);
        let bucket = &summary.months[0];
        assert_eq!(bucket.key, MonthKey { year: 2024, month: 1 });
        assert_eq!(bucket.planned, 100000);
        assert_eq!(bucket.actual, 0);
    }

    #[test]
    fn test_percent_plan_resolves_into_bucket() {
        let mut r = record();
        r.planned_amount_percent = Some(50.0);
        r.order_amount = Some(200000);
        r.planned_date = Some(date("2024-02-01"));

        let summary = aggregate_by_month(&[r]);
        assert_eq!(summary.months.len(), 1);
        assert_eq!(summary.months[0].key, MonthKey { year: 2024, month: 2 });
        assert_eq!(summary.months[0].planned, 100000);
    }

    #[test]
    fn test_zero_actual_amount_is_not_revenue() {
        let mut paid = record();
        paid.actual_amount = Some(50000);
        paid.actual_date = Some(date("2024-01-20"));

        let mut zero = record();
        zero.actual_amount = Some(0);
        zero.actual_date = Some(date("2024-01-25"));

        let records = vec![paid, zero];
        assert_eq!(total_realized_revenue(&records), 50000);

        let summary = aggregate_by_month(&records);
        assert_eq!(summary.months.len(), 1);
        assert_eq!(summary.months[0].actual, 50000);
    }

    #[test]
    fn test_actual_without_date_is_dropped() {
        let mut r = record();
        r.actual_amount = Some(50000);

        assert_eq!(total_realized_revenue(&[r.clone()]), 0);
        assert!(aggregate_by_month(&[r]).is_empty());
    }

    #[test]
    fn test_one_record_two_buckets() {
        let mut r = record();
        r.planned_amount = Some(100000);
        r.planned_date = Some(date("2024-03-10"));
        r.actual_amount = Some(90000);
        r.actual_date = Some(date("2024-04-02"));

        let summary = aggregate_by_month(&[r]);
        assert_eq!(summary.months.len(), 2);

        // Newest first: April before March.
        assert_eq!(summary.months[0].key, MonthKey { year: 2024, month: 4 });
        assert_eq!(summary.months[0].actual, 90000);
        assert_eq!(summary.months[0].planned, 0);

        assert_eq!(summary.months[1].key, MonthKey { year: 2024, month: 3 });
        assert_eq!(summary.months[1].planned, 100000);
        assert_eq!(summary.months[1].actual, 0);
    }

    #[test]
    fn test_same_month_planned_and_actual() {
        let mut r = record();
        r.planned_amount = Some(100000);
        r.planned_date = Some(date("2024-05-01"));
        r.actual_amount = Some(100000);
        r.actual_date = Some(date("2024-05-20"));

        let summary = aggregate_by_month(&[r]);
        assert_eq!(summary.months.len(), 1);
        assert_eq!(summary.months[0].planned, 100000);
        assert_eq!(summary.months[0].actual, 100000);
    }

    #[test]
    fn test_buckets_sorted_newest_first_across_years() {
        let mut a = record();
        a.actual_amount = Some(100);
        a.actual_date = Some(date("2023-12-31"));
        let mut b = record();
        b.actual_amount = Some(200);
        b.actual_date = Some(date("2024-01-01"));
        let mut c = record();
        c.actual_amount = Some(300);
        c.actual_date = Some(date("2024-06-15"));

        let summary = aggregate_by_month(&[a, b, c]);
        let keys: Vec<MonthKey> = summary.months.iter().map(|m| m.key).collect();
        assert_eq!(
            keys,
            vec![
                MonthKey { year: 2024, month: 6 },
                MonthKey { year: 2024, month: 1 },
                MonthKey { year: 2023, month: 12 },
            ]
        );
    }

    #[test]
    fn test_total_matches_bucket_sum() {
        let mut records = Vec::new();
        for (amount, day) in [(30000, "2024-03-01"), (70000, "2024-02-15"), (12500, "2024-02-28")] {
            let mut r = record();
            r.actual_amount = Some(amount);
            r.actual_date = Some(date(day));
            records.push(r);
        }
        // One unrealized record thrown in.
        let mut planned_only = record();
        planned_only.planned_amount = Some(999999);
        planned_only.planned_date = Some(date("2024-01-01"));
        records.push(planned_only);

        let summary = aggregate_by_month(&records);
        assert_eq!(total_realized_revenue(&records), summary.total_actual());
        assert_eq!(total_realized_revenue(&records), 112500);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_by_month(&[]).is_empty());
        assert_eq!(total_realized_revenue(&[]), 0);
        assert!(recent_realized_payments(&[], 5).is_empty());
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let mut r = record();
        r.planned_amount = Some(40000);
        r.planned_date = Some(date("2024-01-05"));
        r.actual_amount = Some(40000);
        r.actual_date = Some(date("2024-01-09"));
        let records = vec![r];

        let first = aggregate_by_month(&records);
        let second = aggregate_by_month(&records);
        assert_eq!(first.months.len(), second.months.len());
        for (a, b) in first.months.iter().zip(second.months.iter()) {
            assert_eq!(a.key, b.key);
            assert_eq!(a.planned, b.planned);
            assert_eq!(a.actual, b.actual);
        }
    }

    #[test]
    fn test_recent_payments_limit_and_order() {
        let mut march = record();
        march.actual_amount = Some(30000);
        march.actual_date = Some(date("2024-03-01"));
        let mut feb = record();
        feb.actual_amount = Some(70000);
        feb.actual_date = Some(date("2024-02-15"));

        let records = vec![feb.clone(), march.clone()];
        let recent = recent_realized_payments(&records, 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, march.id);

        let all = recent_realized_payments(&records, 10);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, march.id);
        assert_eq!(all[1].id, feb.id);
    }

    #[test]
    fn test_recent_payments_tie_break_is_input_order_independent() {
        let mut a = record();
        a.actual_amount = Some(100);
        a.actual_date = Some(date("2024-03-01"));
        let mut b = record();
        b.actual_amount = Some(200);
        b.actual_date = Some(date("2024-03-01"));

        let forward = recent_realized_payments(&[a.clone(), b.clone()], 2);
        let backward = recent_realized_payments(&[b, a], 2);
        assert_eq!(forward[0].id, backward[0].id);
        assert_eq!(forward[1].id, backward[1].id);
    }

    #[test]
    fn test_recent_payments_skips_unrealized() {
        let mut planned = record();
        planned.planned_amount = Some(100000);
        planned.planned_date = Some(date("2024-03-01"));

        let mut zero = record();
        zero.actual_amount = Some(0);
        zero.actual_date = Some(date("2024-03-02"));

        assert!(recent_realized_payments(&[planned, zero], 5).is_empty());
    }

    #[test]
    fn test_month_label() {
        let bucket = MonthBucket {
            key: MonthKey { year: 2024, month: 3 },
            planned: 0,
            actual: 0,
        };
        assert_eq!(bucket.label(), "March 2024");
    }
}
