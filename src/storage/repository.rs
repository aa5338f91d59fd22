use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Client, ClientId, Contact, Order, OrderId, OrderStatus, Payment, PaymentId, PaymentRecord,
    PaymentStatus, PaymentType, Project, ProjectId,
};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting and querying clients, projects, orders and
/// payments.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Client operations
    // ========================

    pub async fn save_client(&self, client: &Client) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, notes, created_at, archived_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(client.id.to_string())
        .bind(&client.name)
        .bind(&client.notes)
        .bind(client.created_at.to_rfc3339())
        .bind(client.archived_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save client")?;
        Ok(())
    }

    pub async fn get_client_by_name(&self, name: &str) -> Result<Option<Client>> {
        let row = sqlx::query(
            "SELECT id, name, notes, created_at, archived_at FROM clients WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch client by name")?;

        row.as_ref().map(Self::row_to_client).transpose()
    }

    pub async fn list_clients(&self, include_archived: bool) -> Result<Vec<Client>> {
        let query = if include_archived {
            "SELECT id, name, notes, created_at, archived_at FROM clients ORDER BY name"
        } else {
            "SELECT id, name, notes, created_at, archived_at FROM clients WHERE archived_at IS NULL ORDER BY name"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list clients")?;

        rows.iter().map(Self::row_to_client).collect()
    }

    pub async fn archive_client(&self, id: ClientId) -> Result<()> {
        self.archive_row("clients", id.to_string()).await
    }

    pub async fn count_active_clients(&self) -> Result<i64> {
        self.count_active("clients").await
    }

    fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Result<Client> {
        let id_str: String = row.get("id");
        Ok(Client {
            id: Uuid::parse_str(&id_str).context("Invalid client ID")?,
            name: row.get("name"),
            notes: row.get("notes"),
            created_at: parse_timestamp(row.get("created_at"))?,
            archived_at: parse_opt_timestamp(row.get("archived_at"))?,
        })
    }

    // ========================
    // Contact operations
    // ========================

    pub async fn save_contact(&self, contact: &Contact) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO contacts (id, client_id, full_name, position, phone, email)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(contact.id.to_string())
        .bind(contact.client_id.to_string())
        .bind(&contact.full_name)
        .bind(&contact.position)
        .bind(&contact.phone)
        .bind(&contact.email)
        .execute(&self.pool)
        .await
        .context("Failed to save contact")?;
        Ok(())
    }

    pub async fn list_contacts_for_client(&self, client_id: ClientId) -> Result<Vec<Contact>> {
        let rows = sqlx::query(
            r#"
            SELECT id, client_id, full_name, position, phone, email
            FROM contacts
            WHERE client_id = ?
            ORDER BY full_name
            "#,
        )
        .bind(client_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contacts")?;

        rows.iter()
            .map(|row| {
                let id_str: String = row.get("id");
                let client_id_str: String = row.get("client_id");
                Ok(Contact {
                    id: Uuid::parse_str(&id_str).context("Invalid contact ID")?,
                    client_id: Uuid::parse_str(&client_id_str).context("Invalid client ID")?,
                    full_name: row.get("full_name"),
                    position: row.get("position"),
                    phone: row.get("phone"),
                    email: row.get("email"),
                })
            })
            .collect()
    }

    // ========================
    // Project operations
    // ========================

    pub async fn save_project(&self, project: &Project) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, client_id, created_at, archived_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project.id.to_string())
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.client_id.to_string())
        .bind(project.created_at.to_rfc3339())
        .bind(project.archived_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save project")?;
        Ok(())
    }

    pub async fn get_project_by_name(&self, name: &str) -> Result<Option<Project>> {
        let row = sqlx::query(
            "SELECT id, name, description, client_id, created_at, archived_at FROM projects WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch project by name")?;

        row.as_ref().map(Self::row_to_project).transpose()
    }

    pub async fn list_projects(&self, include_archived: bool) -> Result<Vec<Project>> {
        let query = if include_archived {
            "SELECT id, name, description, client_id, created_at, archived_at FROM projects ORDER BY name"
        } else {
            "SELECT id, name, description, client_id, created_at, archived_at FROM projects WHERE archived_at IS NULL ORDER BY name"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")?;

        rows.iter().map(Self::row_to_project).collect()
    }

    pub async fn archive_project(&self, id: ProjectId) -> Result<()> {
        self.archive_row("projects", id.to_string()).await
    }

    pub async fn count_active_projects(&self) -> Result<i64> {
        self.count_active("projects").await
    }

    fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> Result<Project> {
        let id_str: String = row.get("id");
        let client_id_str: String = row.get("client_id");
        Ok(Project {
            id: Uuid::parse_str(&id_str).context("Invalid project ID")?,
            name: row.get("name"),
            description: row.get("description"),
            client_id: Uuid::parse_str(&client_id_str).context("Invalid client ID")?,
            created_at: parse_timestamp(row.get("created_at"))?,
            archived_at: parse_opt_timestamp(row.get("archived_at"))?,
        })
    }

    // ========================
    // Order operations
    // ========================

    pub async fn save_order(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, name, description, amount_cents, order_status, payment_status, payment_type, project_id, created_at, archived_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(&order.name)
        .bind(&order.description)
        .bind(order.amount)
        .bind(order.order_status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.payment_type.as_str())
        .bind(order.project_id.to_string())
        .bind(order.created_at.to_rfc3339())
        .bind(order.archived_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save order")?;
        Ok(())
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, amount_cents, order_status, payment_status, payment_type, project_id, created_at, archived_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch order")?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    pub async fn get_order_by_name(&self, name: &str) -> Result<Option<Order>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, amount_cents, order_status, payment_status, payment_type, project_id, created_at, archived_at
            FROM orders
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch order by name")?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    pub async fn list_orders(&self, include_archived: bool) -> Result<Vec<Order>> {
        let query = if include_archived {
            "SELECT id, name, description, amount_cents, order_status, payment_status, payment_type, project_id, created_at, archived_at FROM orders ORDER BY created_at"
        } else {
            "SELECT id, name, description, amount_cents, order_status, payment_status, payment_type, project_id, created_at, archived_at FROM orders WHERE archived_at IS NULL ORDER BY created_at"
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list orders")?;

        rows.iter().map(Self::row_to_order).collect()
    }

    pub async fn update_order_status(&self, id: OrderId, status: OrderStatus) -> Result<()> {
        sqlx::query("UPDATE orders SET order_status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update order status")?;
        Ok(())
    }

    pub async fn update_order_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE orders SET payment_status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to update order payment status")?;
        Ok(())
    }

    pub async fn archive_order(&self, id: OrderId) -> Result<()> {
        self.archive_row("orders", id.to_string()).await
    }

    pub async fn count_active_orders(&self) -> Result<i64> {
        self.count_active("orders").await
    }

    fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<Order> {
        let id_str: String = row.get("id");
        let project_id_str: String = row.get("project_id");
        let order_status_str: String = row.get("order_status");
        let payment_status_str: String = row.get("payment_status");
        let payment_type_str: String = row.get("payment_type");

        Ok(Order {
            id: Uuid::parse_str(&id_str).context("Invalid order ID")?,
            name: row.get("name"),
            description: row.get("description"),
            amount: row.get("amount_cents"),
            order_status: OrderStatus::from_str(&order_status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid order status: {}", order_status_str))?,
            payment_status: PaymentStatus::from_str(&payment_status_str).ok_or_else(|| {
                anyhow::anyhow!("Invalid payment status: {}", payment_status_str)
            })?,
            payment_type: PaymentType::from_str(&payment_type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid payment type: {}", payment_type_str))?,
            project_id: Uuid::parse_str(&project_id_str).context("Invalid project ID")?,
            created_at: parse_timestamp(row.get("created_at"))?,
            archived_at: parse_opt_timestamp(row.get("archived_at"))?,
        })
    }

    // ========================
    // Payment operations
    // ========================

    pub async fn save_payment(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, planned_amount_cents, planned_amount_percent, planned_date, actual_amount_cents, actual_date, created_at, archived_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id.to_string())
        .bind(payment.order_id.to_string())
        .bind(payment.planned_amount)
        .bind(payment.planned_amount_percent)
        .bind(payment.planned_date.map(|d| d.to_string()))
        .bind(payment.actual_amount)
        .bind(payment.actual_date.map(|d| d.to_string()))
        .bind(payment.created_at.to_rfc3339())
        .bind(payment.archived_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .context("Failed to save payment")?;
        Ok(())
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, planned_amount_cents, planned_amount_percent, planned_date, actual_amount_cents, actual_date, created_at, archived_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch payment")?;

        row.as_ref().map(Self::row_to_payment).transpose()
    }

    pub async fn set_payment_actual(
        &self,
        id: PaymentId,
        amount: i64,
        date: NaiveDate,
    ) -> Result<()> {
        sqlx::query("UPDATE payments SET actual_amount_cents = ?, actual_date = ? WHERE id = ?")
            .bind(amount)
            .bind(date.to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to record actual payment")?;
        Ok(())
    }

    pub async fn archive_payment(&self, id: PaymentId) -> Result<()> {
        self.archive_row("payments", id.to_string()).await
    }

    fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment> {
        let id_str: String = row.get("id");
        let order_id_str: String = row.get("order_id");

        Ok(Payment {
            id: Uuid::parse_str(&id_str).context("Invalid payment ID")?,
            order_id: Uuid::parse_str(&order_id_str).context("Invalid order ID")?,
            planned_amount: row.get("planned_amount_cents"),
            planned_amount_percent: row.get("planned_amount_percent"),
            planned_date: parse_opt_day(row.get("planned_date")),
            actual_amount: row.get("actual_amount_cents"),
            actual_date: parse_opt_day(row.get("actual_date")),
            created_at: parse_timestamp(row.get("created_at"))?,
            archived_at: parse_opt_timestamp(row.get("archived_at"))?,
        })
    }

    /// Fetch the payment records the revenue aggregation consumes: payments
    /// joined with their parent order's amount and name.
    pub async fn list_payment_records(&self, include_archived: bool) -> Result<Vec<PaymentRecord>> {
        let query = if include_archived {
            r#"
            SELECT p.id, p.order_id, p.planned_amount_cents, p.planned_amount_percent,
                   p.planned_date, p.actual_amount_cents, p.actual_date,
                   o.amount_cents AS order_amount_cents, o.name AS order_name
            FROM payments p
            LEFT JOIN orders o ON o.id = p.order_id
            ORDER BY p.created_at
            "#
        } else {
            r#"
            SELECT p.id, p.order_id, p.planned_amount_cents, p.planned_amount_percent,
                   p.planned_date, p.actual_amount_cents, p.actual_date,
                   o.amount_cents AS order_amount_cents, o.name AS order_name
            FROM payments p
            LEFT JOIN orders o ON o.id = p.order_id
            WHERE p.archived_at IS NULL
            ORDER BY p.created_at
            "#
        };

        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list payment records")?;

        rows.iter()
            .map(|row| {
                let id_str: String = row.get("id");
                let order_id_str: String = row.get("order_id");
                Ok(PaymentRecord {
                    id: Uuid::parse_str(&id_str).context("Invalid payment ID")?,
                    order_id: Uuid::parse_str(&order_id_str).context("Invalid order ID")?,
                    planned_amount: row.get("planned_amount_cents"),
                    planned_amount_percent: row.get("planned_amount_percent"),
                    planned_date: parse_opt_day(row.get("planned_date")),
                    actual_amount: row.get("actual_amount_cents"),
                    actual_date: parse_opt_day(row.get("actual_date")),
                    order_amount: row.get("order_amount_cents"),
                    order_name: row.get("order_name"),
                })
            })
            .collect()
    }

    // ========================
    // Shared helpers
    // ========================

    async fn archive_row(&self, table: &str, id: String) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let query = format!("UPDATE {} SET archived_at = ? WHERE id = ?", table);
        sqlx::query(&query)
            .bind(&now)
            .bind(&id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to archive row in {}", table))?;
        Ok(())
    }

    async fn count_active(&self, table: &str) -> Result<i64> {
        let query = format!(
            "SELECT COUNT(*) as count FROM {} WHERE archived_at IS NULL",
            table
        );
        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(row.get("count"))
    }
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(&value)
        .context("Invalid timestamp")?
        .with_timezone(&Utc))
}

fn parse_opt_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.map(parse_timestamp).transpose()
}

/// Plan/realization dates degrade gracefully: a malformed cell means "no date
/// on that side", never a failed query, so one bad row cannot take down a
/// whole dashboard.
fn parse_opt_day(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::parse_opt_day;

    #[test]
    fn test_malformed_day_becomes_none() {
        assert!(parse_opt_day(Some("not-a-date".into())).is_none());
        assert!(parse_opt_day(Some("2024-13-45".into())).is_none());
        assert!(parse_opt_day(None).is_none());
        assert!(parse_opt_day(Some("2024-03-01".into())).is_some());
    }
}
