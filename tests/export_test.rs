mod common;

use anyhow::Result;
use common::*;
use reditus::io::Exporter;

#[tokio::test]
async fn test_export_clients_csv() -> Result<()> {
    let (service, _tmp) = test_service().await?;
    service.create_client("Acme".into(), None).await?;
    service.create_client("Globex".into(), None).await?;

    let exporter = Exporter::new(&service);
    let mut buf = Vec::new();
    let count = exporter.export_clients_csv(&mut buf).await?;

    assert_eq!(count, 2);
    let output = String::from_utf8(buf)?;
    let mut lines = output.lines();
    assert_eq!(
        lines.next(),
        Some("id,name,notes,created_at,archived_at")
    );
    assert_eq!(output.lines().count(), 3);
    assert!(output.contains("Acme"));
    assert!(output.contains("Globex"));

    Ok(())
}

#[tokio::test]
async fn test_export_orders_csv_formats_amount() -> Result<()> {
    let (service, _tmp) = test_service().await?;
    AcmeSetup::create_basic(&service).await?;
    AcmeSetup::add_order(&service, "Redesign", 250_000).await?;

    let exporter = Exporter::new(&service);
    let mut buf = Vec::new();
    let count = exporter.export_orders_csv(&mut buf).await?;

    assert_eq!(count, 1);
    let output = String::from_utf8(buf)?;
    assert!(output.contains("Redesign"));
    assert!(output.contains("2500.00"));
    assert!(output.contains("postpaid"));

    Ok(())
}

#[tokio::test]
async fn test_export_payments_csv_includes_archived() -> Result<()> {
    let (service, _tmp) = test_service().await?;
    AcmeSetup::create_basic(&service).await?;
    AcmeSetup::add_order(&service, "Audit", 100_000).await?;

    let kept = AcmeSetup::paid_payment(&service, "Audit", 60_000, day("2024-03-01")).await?;
    let archived = AcmeSetup::paid_payment(&service, "Audit", 40_000, day("2024-03-02")).await?;
    service.archive_payment(archived.id).await?;

    let exporter = Exporter::new(&service);
    let mut buf = Vec::new();
    let count = exporter.export_payments_csv(&mut buf).await?;

    // Exports are a full dump, archived rows included.
    assert_eq!(count, 2);
    let output = String::from_utf8(buf)?;
    assert!(output.contains(&kept.id.to_string()));
    assert!(output.contains(&archived.id.to_string()));

    Ok(())
}

#[tokio::test]
async fn test_export_dashboard_json_roundtrips() -> Result<()> {
    let (service, _tmp) = test_service().await?;
    AcmeSetup::create_basic(&service).await?;
    AcmeSetup::add_order(&service, "Audit", 100_000).await?;
    AcmeSetup::paid_payment(&service, "Audit", 100_000, day("2024-03-01")).await?;

    let exporter = Exporter::new(&service);
    let mut buf = Vec::new();
    exporter.export_dashboard_json(&mut buf, 5).await?;

    let value: serde_json::Value = serde_json::from_slice(&buf)?;
    assert_eq!(value["stats"]["total_revenue"], 100_000);
    assert_eq!(value["revenue_by_month"]["months"][0]["actual"], 100_000);
    assert_eq!(value["recent_payments"][0]["order_name"], "Audit");

    Ok(())
}
