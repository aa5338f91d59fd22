use chrono::{NaiveDate, Utc};

use crate::domain::{
    aggregate_by_month, recent_realized_payments, total_realized_revenue, Cents, Client, Contact,
    Order, OrderStatus, Payment, PaymentId, PaymentRecord, PaymentStatus, PaymentType, Project,
};
use crate::storage::Repository;

use super::{AppError, DashboardReport, DashboardStats};

/// Application service providing high-level operations over the business
/// ledger. This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct CompanyService {
    repo: Repository,
}

/// A client together with its contact people.
pub struct ClientInfo {
    pub client: Client,
    pub contacts: Vec<Contact>,
}

/// How a payment plan is expressed when recorded.
#[derive(Debug, Clone, Copy)]
pub enum PaymentPlan {
    /// Absolute amount in cents.
    Amount(Cents),
    /// Percentage of the parent order amount, 0-100.
    Percent(f64),
}

impl CompanyService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Client operations
    // ========================

    pub async fn create_client(
        &self,
        name: String,
        notes: Option<String>,
    ) -> Result<Client, AppError> {
        if self.repo.get_client_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "client '{}' already exists",
                name
            )));
        }

        let mut client = Client::new(name);
        if let Some(notes) = notes {
            client = client.with_notes(notes);
        }

        self.repo.save_client(&client).await?;
        Ok(client)
    }

    pub async fn get_client(&self, name: &str) -> Result<Client, AppError> {
        self.repo
            .get_client_by_name(name)
            .await?
            .ok_or_else(|| AppError::ClientNotFound(name.to_string()))
    }

    pub async fn get_client_info(&self, name: &str) -> Result<ClientInfo, AppError> {
        let client = self.get_client(name).await?;
        let contacts = self.repo.list_contacts_for_client(client.id).await?;
        Ok(ClientInfo { client, contacts })
    }

    pub async fn list_clients(&self, include_archived: bool) -> Result<Vec<Client>, AppError> {
        Ok(self.repo.list_clients(include_archived).await?)
    }

    pub async fn archive_client(&self, name: &str) -> Result<Client, AppError> {
        let client = self.get_client(name).await?;
        self.repo.archive_client(client.id).await?;
        Ok(client)
    }

    pub async fn add_contact(
        &self,
        client_name: &str,
        full_name: String,
        position: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Result<Contact, AppError> {
        let client = self.get_client(client_name).await?;
        if client.is_archived() {
            return Err(AppError::ClientArchived(client_name.to_string()));
        }

        let mut contact = Contact::new(client.id, full_name);
        if let Some(position) = position {
            contact = contact.with_position(position);
        }
        if let Some(phone) = phone {
            contact = contact.with_phone(phone);
        }
        if let Some(email) = email {
            contact = contact.with_email(email);
        }

        self.repo.save_contact(&contact).await?;
        Ok(contact)
    }

    // ========================
    // Project operations
    // ========================

    pub async fn create_project(
        &self,
        name: String,
        description: Option<String>,
        client_name: &str,
    ) -> Result<Project, AppError> {
        if self.repo.get_project_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "project '{}' already exists",
                name
            )));
        }

        let client = self.get_client(client_name).await?;
        if client.is_archived() {
            return Err(AppError::ClientArchived(client_name.to_string()));
        }

        let mut project = Project::new(name, client.id);
        if let Some(desc) = description {
            project = project.with_description(desc);
        }

        self.repo.save_project(&project).await?;
        Ok(project)
    }

    pub async fn get_project(&self, name: &str) -> Result<Project, AppError> {
        self.repo
            .get_project_by_name(name)
            .await?
            .ok_or_else(|| AppError::ProjectNotFound(name.to_string()))
    }

    pub async fn list_projects(&self, include_archived: bool) -> Result<Vec<Project>, AppError> {
        Ok(self.repo.list_projects(include_archived).await?)
    }

    pub async fn archive_project(&self, name: &str) -> Result<Project, AppError> {
        let project = self.get_project(name).await?;
        self.repo.archive_project(project.id).await?;
        Ok(project)
    }

    // ========================
    // Order operations
    // ========================

    pub async fn create_order(
        &self,
        name: String,
        description: Option<String>,
        amount: Cents,
        payment_type: PaymentType,
        project_name: &str,
    ) -> Result<Order, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Order amount must be positive".to_string(),
            ));
        }
        if self.repo.get_order_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "order '{}' already exists",
                name
            )));
        }

        let project = self.get_project(project_name).await?;
        if project.is_archived() {
            return Err(AppError::ProjectArchived(project_name.to_string()));
        }

        let mut order = Order::new(name, amount, payment_type, project.id);
        if let Some(desc) = description {
            order = order.with_description(desc);
        }

        self.repo.save_order(&order).await?;
        Ok(order)
    }

    pub async fn get_order(&self, name: &str) -> Result<Order, AppError> {
        self.repo
            .get_order_by_name(name)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(name.to_string()))
    }

    pub async fn list_orders(&self, include_archived: bool) -> Result<Vec<Order>, AppError> {
        Ok(self.repo.list_orders(include_archived).await?)
    }

    pub async fn set_order_status(
        &self,
        name: &str,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        let order = self.get_order(name).await?;
        if order.is_archived() {
            return Err(AppError::OrderArchived(name.to_string()));
        }
        self.repo.update_order_status(order.id, status).await?;
        Ok(order)
    }

    pub async fn archive_order(&self, name: &str) -> Result<Order, AppError> {
        let order = self.get_order(name).await?;
        self.repo.archive_order(order.id).await?;
        Ok(order)
    }

    // ========================
    // Payment operations
    // ========================

    /// Record a planned payment against an order, either as an absolute
    /// amount or as a percentage of the order amount. The two forms are
    /// mutually exclusive by construction.
    pub async fn plan_payment(
        &self,
        order_name: &str,
        plan: PaymentPlan,
        planned_date: Option<NaiveDate>,
    ) -> Result<Payment, AppError> {
        let order = self.get_order(order_name).await?;
        if order.is_archived() {
            return Err(AppError::OrderArchived(order_name.to_string()));
        }

        let payment = match plan {
            PaymentPlan::Amount(amount) => {
                if amount <= 0 {
                    return Err(AppError::InvalidAmount(
                        "Planned amount must be positive".to_string(),
                    ));
                }
                Payment::new(order.id).with_planned_amount(amount, planned_date)
            }
            PaymentPlan::Percent(percent) => {
                if percent <= 0.0 || percent > 100.0 {
                    return Err(AppError::InvalidPercent(percent));
                }
                Payment::new(order.id).with_planned_percent(percent, planned_date)
            }
        };

        self.repo.save_payment(&payment).await?;

        if order.payment_status == PaymentStatus::NotPaid {
            self.repo
                .update_order_payment_status(order.id, PaymentStatus::AwaitingPayment)
                .await?;
        }

        Ok(payment)
    }

    /// Realize a payment: set its actual amount and date, then roll the parent
    /// order's payment status forward (partially_paid, or paid once realized
    /// revenue covers the order amount).
    pub async fn record_actual_payment(
        &self,
        payment_id: PaymentId,
        amount: Cents,
        date: NaiveDate,
    ) -> Result<Payment, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Actual amount must be positive".to_string(),
            ));
        }

        let payment = self
            .repo
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))?;

        self.repo
            .set_payment_actual(payment.id, amount, date)
            .await?;

        if let Some(order) = self.repo.get_order(payment.order_id).await? {
            let records = self.repo.list_payment_records(false).await?;
            let realized: Cents = records
                .iter()
                .filter(|r| r.order_id == order.id && r.is_realized())
                .filter_map(|r| r.actual_amount)
                .sum();

            let status = if realized >= order.amount {
                PaymentStatus::Paid
            } else {
                PaymentStatus::PartiallyPaid
            };
            self.repo
                .update_order_payment_status(order.id, status)
                .await?;
        }

        self.repo
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))
    }

    /// List payments joined with their parent order, the shape the dashboard
    /// and the CLI tables consume.
    pub async fn list_payment_records(
        &self,
        include_archived: bool,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        Ok(self.repo.list_payment_records(include_archived).await?)
    }

    pub async fn archive_payment(&self, payment_id: PaymentId) -> Result<(), AppError> {
        let payment = self
            .repo
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))?;
        self.repo.archive_payment(payment.id).await?;
        Ok(())
    }

    // ========================
    // Dashboard
    // ========================

    /// Build the dashboard snapshot: headline stats, planned-vs-actual
    /// revenue per month and the most recent realized payments.
    pub async fn dashboard(&self, recent_limit: usize) -> Result<DashboardReport, AppError> {
        let records = self.repo.list_payment_records(false).await?;

        let stats = DashboardStats {
            total_revenue: total_realized_revenue(&records),
            active_clients: self.repo.count_active_clients().await?,
            active_projects: self.repo.count_active_projects().await?,
            active_orders: self.repo.count_active_orders().await?,
        };

        Ok(DashboardReport {
            generated_at: Utc::now(),
            stats,
            revenue_by_month: aggregate_by_month(&records),
            recent_payments: recent_realized_payments(&records, recent_limit),
        })
    }
}
