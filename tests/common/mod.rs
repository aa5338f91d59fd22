// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use reditus::application::{CompanyService, PaymentPlan};
use reditus::domain::{Cents, Payment, PaymentType};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(CompanyService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = CompanyService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into NaiveDate
pub fn day(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: a client with one project, ready for orders
pub struct AcmeSetup;

impl AcmeSetup {
    /// Create the "Acme" client and its "Website" project
    pub async fn create_basic(service: &CompanyService) -> Result<()> {
        service.create_client("Acme".into(), None).await?;
        service
            .create_project("Website".into(), None, "Acme")
            .await?;
        Ok(())
    }

    /// Create an order under the Website project
    pub async fn add_order(service: &CompanyService, name: &str, amount: Cents) -> Result<()> {
        service
            .create_order(name.into(), None, amount, PaymentType::Postpaid, "Website")
            .await?;
        Ok(())
    }

    /// Plan a payment with an absolute amount and immediately realize it
    pub async fn paid_payment(
        service: &CompanyService,
        order: &str,
        amount: Cents,
        date: NaiveDate,
    ) -> Result<Payment> {
        let payment = service
            .plan_payment(order, PaymentPlan::Amount(amount), Some(date))
            .await?;
        let payment = service
            .record_actual_payment(payment.id, amount, date)
            .await?;
        Ok(payment)
    }
}
