use anyhow::Result;
use std::io::Write;

use crate::application::CompanyService;
use crate::domain::format_cents;

/// Exporter for dumping ledger data to CSV or JSON.
pub struct Exporter<'a> {
    service: &'a CompanyService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a CompanyService) -> Self {
        Self { service }
    }

    /// Export clients to CSV format.
    pub async fn export_clients_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let clients = self.service.list_clients(true).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "name", "notes", "created_at", "archived_at"])?;

        let mut count = 0;
        for client in &clients {
            csv_writer.write_record(&[
                client.id.to_string(),
                client.name.clone(),
                client.notes.clone().unwrap_or_default(),
                client.created_at.to_rfc3339(),
                client
                    .archived_at
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export orders to CSV format.
    pub async fn export_orders_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let orders = self.service.list_orders(true).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "name",
            "amount",
            "order_status",
            "payment_status",
            "payment_type",
            "project_id",
            "created_at",
        ])?;

        let mut count = 0;
        for order in &orders {
            csv_writer.write_record(&[
                order.id.to_string(),
                order.name.clone(),
                format_cents(order.amount),
                order.order_status.to_string(),
                order.payment_status.to_string(),
                order.payment_type.to_string(),
                order.project_id.to_string(),
                order.created_at.to_rfc3339(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export payment records (payments joined with their order) to CSV.
    pub async fn export_payments_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.service.list_payment_records(true).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "order_name",
            "planned_amount",
            "planned_amount_percent",
            "planned_date",
            "actual_amount",
            "actual_date",
        ])?;

        let mut count = 0;
        for record in &records {
            csv_writer.write_record(&[
                record.id.to_string(),
                record.order_name.clone().unwrap_or_default(),
                record.planned_amount.map(format_cents).unwrap_or_default(),
                record
                    .planned_amount_percent
                    .map(|p| format!("{}", p))
                    .unwrap_or_default(),
                record
                    .planned_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                record.actual_amount.map(format_cents).unwrap_or_default(),
                record
                    .actual_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full dashboard report as pretty JSON.
    pub async fn export_dashboard_json<W: Write>(
        &self,
        mut writer: W,
        recent_limit: usize,
    ) -> Result<()> {
        let report = self.service.dashboard(recent_limit).await?;
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writeln!(writer)?;
        Ok(())
    }
}
