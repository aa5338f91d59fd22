use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, OrderId};

pub type PaymentId = Uuid;

/// A payment attached to an order, as persisted.
///
/// The planned side is either an absolute amount or a percentage of the order
/// amount, never both. The actual side only counts as realized revenue once it
/// carries both a positive amount and a realization date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub planned_amount: Option<Cents>,
    /// Share of the order amount, 0-100.
    pub planned_amount_percent: Option<f64>,
    pub planned_date: Option<NaiveDate>,
    pub actual_amount: Option<Cents>,
    pub actual_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            planned_amount: None,
            planned_amount_percent: None,
            planned_date: None,
            actual_amount: None,
            actual_date: None,
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    /// Plan an absolute amount. Clears any percentage plan.
    pub fn with_planned_amount(mut self, amount: Cents, date: Option<NaiveDate>) -> Self {
        self.planned_amount = Some(amount);
        self.planned_amount_percent = None;
        self.planned_date = date;
        self
    }

    /// Plan a percentage of the order amount. Clears any absolute plan.
    pub fn with_planned_percent(mut self, percent: f64, date: Option<NaiveDate>) -> Self {
        self.planned_amount_percent = Some(percent);
        self.planned_amount = None;
        self.planned_date = date;
        self
    }

    pub fn with_actual(mut self, amount: Cents, date: NaiveDate) -> Self {
        self.actual_amount = Some(amount);
        self.actual_date = Some(date);
        self
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    /// True once the payment has really been received.
    pub fn is_realized(&self) -> bool {
        self.actual_date.is_some() && self.actual_amount.unwrap_or(0) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_plans_are_mutually_exclusive() {
        let payment = Payment::new(Uuid::new_v4())
            .with_planned_amount(100000, Some(date("2024-01-15")))
            .with_planned_percent(50.0, Some(date("2024-01-15")));
        assert!(payment.planned_amount.is_none());
        assert_eq!(payment.planned_amount_percent, Some(50.0));

        let payment = Payment::new(Uuid::new_v4())
            .with_planned_percent(50.0, None)
            .with_planned_amount(100000, None);
        assert_eq!(payment.planned_amount, Some(100000));
        assert!(payment.planned_amount_percent.is_none());
    }

    #[test]
    fn test_realized_requires_date_and_positive_amount() {
        let unpaid = Payment::new(Uuid::new_v4()).with_planned_amount(100000, None);
        assert!(!unpaid.is_realized());

        let zero = Payment::new(Uuid::new_v4()).with_actual(0, date("2024-01-20"));
        assert!(!zero.is_realized());

        let paid = Payment::new(Uuid::new_v4()).with_actual(50000, date("2024-01-20"));
        assert!(paid.is_realized());
    }
}
