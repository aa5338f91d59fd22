use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, ProjectId};

pub type OrderId = Uuid;

/// Progress of the work behind an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProgress,
    Completed,
    Done,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(OrderStatus::New),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "done" => Some(OrderStatus::Done),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How much of the order has been paid so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    NotPaid,
    AwaitingPayment,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::NotPaid => "not_paid",
            PaymentStatus::AwaitingPayment => "awaiting_payment",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_paid" => Some(PaymentStatus::NotPaid),
            "awaiting_payment" => Some(PaymentStatus::AwaitingPayment),
            "partially_paid" => Some(PaymentStatus::PartiallyPaid),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Agreed payment arrangement for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Prepaid,
    Postpaid,
    Installments,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Prepaid => "prepaid",
            PaymentType::Postpaid => "postpaid",
            PaymentType::Installments => "installments",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "prepaid" => Some(PaymentType::Prepaid),
            "postpaid" => Some(PaymentType::Postpaid),
            "installments" => Some(PaymentType::Installments),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A commercial order: the parent transaction every payment hangs off.
/// Its `amount` is what percentage-based payment plans resolve against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub description: Option<String>,
    pub amount: Cents,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_type: PaymentType,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(name: String, amount: Cents, payment_type: PaymentType, project_id: ProjectId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            amount,
            order_status: OrderStatus::New,
            payment_status: PaymentStatus::NotPaid,
            payment_type,
            project_id,
            created_at: Utc::now(),
            archived_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrips() {
        for os in [
            OrderStatus::New,
            OrderStatus::InProgress,
            OrderStatus::Completed,
            OrderStatus::Done,
        ] {
            assert_eq!(OrderStatus::from_str(os.as_str()), Some(os));
        }
        for ps in [
            PaymentStatus::NotPaid,
            PaymentStatus::AwaitingPayment,
            PaymentStatus::PartiallyPaid,
            PaymentStatus::Paid,
        ] {
            assert_eq!(PaymentStatus::from_str(ps.as_str()), Some(ps));
        }
        for pt in [
            PaymentType::Prepaid,
            PaymentType::Postpaid,
            PaymentType::Installments,
        ] {
            assert_eq!(PaymentType::from_str(pt.as_str()), Some(pt));
        }
    }

    #[test]
    fn test_new_order_defaults() {
        let order = Order::new("Site redesign".into(), 250000, PaymentType::Prepaid, Uuid::new_v4());
        assert_eq!(order.order_status, OrderStatus::New);
        assert_eq!(order.payment_status, PaymentStatus::NotPaid);
        assert!(!order.is_archived());
    }

    #[test]
    fn test_unknown_status_string() {
        assert_eq!(OrderStatus::from_str("cancelled"), None);
    }
}
