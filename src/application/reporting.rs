use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Cents, PaymentRecord, RevenueSummary};

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_revenue: Cents,
    pub active_clients: i64,
    pub active_projects: i64,
    pub active_orders: i64,
}

/// Everything the dashboard shows in one shot: headline stats, the monthly
/// planned-vs-actual series and the latest realized payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub stats: DashboardStats,
    pub revenue_by_month: RevenueSummary,
    pub recent_payments: Vec<PaymentRecord>,
}
