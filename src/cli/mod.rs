use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{CompanyService, PaymentPlan};
use crate::domain::{format_cents, parse_cents, OrderStatus, PaymentType};

/// Reditus - Revenue ledger for small service businesses
#[derive(Parser)]
#[command(name = "reditus")]
#[command(about = "A local-first revenue ledger: clients, projects, orders and planned-vs-actual payments")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "reditus.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Client management commands
    #[command(subcommand)]
    Client(ClientCommands),

    /// Project management commands
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Order management commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Payment management commands
    #[command(subcommand)]
    Payment(PaymentCommands),

    /// Show the dashboard: totals, revenue by month, recent payments
    Dashboard {
        /// How many recent payments to show
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: clients, orders, payments, dashboard
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ClientCommands {
    /// Add a new client
    Add {
        /// Client name (must be unique)
        name: String,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List clients
    List {
        /// Include archived clients
        #[arg(long)]
        all: bool,
    },

    /// Show a client with its contacts
    Show {
        /// Client name
        name: String,
    },

    /// Add a contact person to a client
    Contact {
        /// Client name
        client: String,

        /// Contact full name
        full_name: String,

        /// Position/role
        #[arg(long)]
        position: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Email address
        #[arg(long)]
        email: Option<String>,
    },

    /// Archive a client (soft delete)
    Archive {
        /// Client name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Add a new project for a client
    Add {
        /// Project name (must be unique)
        name: String,

        /// Client name the project belongs to
        #[arg(short, long)]
        client: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List projects
    List {
        /// Include archived projects
        #[arg(long)]
        all: bool,
    },

    /// Archive a project (soft delete)
    Archive {
        /// Project name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Add a new order under a project
    Add {
        /// Order name (must be unique)
        name: String,

        /// Project name the order belongs to
        #[arg(short, long)]
        project: String,

        /// Order amount (e.g., "2500" or "2500.00")
        #[arg(short, long)]
        amount: String,

        /// Payment arrangement: prepaid, postpaid, installments
        #[arg(short = 't', long = "type", default_value = "postpaid")]
        payment_type: String,

        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List orders
    List {
        /// Include archived orders
        #[arg(long)]
        all: bool,
    },

    /// Show detailed order information
    Show {
        /// Order name
        name: String,
    },

    /// Update the work status of an order
    SetStatus {
        /// Order name
        name: String,

        /// Status: new, in_progress, completed, done
        status: String,
    },

    /// Archive an order (soft delete)
    Archive {
        /// Order name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Plan a payment against an order
    Plan {
        /// Order name
        order: String,

        /// Planned amount (e.g., "1000.00"); mutually exclusive with --percent
        #[arg(short, long)]
        amount: Option<String>,

        /// Planned share of the order amount, 0-100; mutually exclusive with --amount
        #[arg(short, long)]
        percent: Option<f64>,

        /// Expected date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Record an actual (received) payment
    Pay {
        /// Payment ID
        id: String,

        /// Received amount (e.g., "1000.00")
        #[arg(short, long)]
        amount: String,

        /// Date received (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List payments with their parent order
    List {
        /// Include archived payments
        #[arg(long)]
        all: bool,
    },

    /// Archive a payment (soft delete)
    Archive {
        /// Payment ID
        id: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                CompanyService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Client(cmd) => {
                let service = CompanyService::connect(&self.database).await?;
                run_client_command(&service, cmd).await?;
            }

            Commands::Project(cmd) => {
                let service = CompanyService::connect(&self.database).await?;
                run_project_command(&service, cmd).await?;
            }

            Commands::Order(cmd) => {
                let service = CompanyService::connect(&self.database).await?;
                run_order_command(&service, cmd).await?;
            }

            Commands::Payment(cmd) => {
                let service = CompanyService::connect(&self.database).await?;
                run_payment_command(&service, cmd).await?;
            }

            Commands::Dashboard { limit, format } => {
                let service = CompanyService::connect(&self.database).await?;
                run_dashboard_command(&service, limit, &format, self.verbose).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = CompanyService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn run_client_command(service: &CompanyService, cmd: ClientCommands) -> Result<()> {
    match cmd {
        ClientCommands::Add { name, notes } => {
            let client = service.create_client(name, notes).await?;
            println!("Created client: {}", client.name);
        }

        ClientCommands::List { all } => {
            let clients = service.list_clients(all).await?;
            if clients.is_empty() {
                println!("No clients found.");
            } else {
                println!("{:<25} {:<12} NOTES", "NAME", "SINCE");
                println!("{}", "-".repeat(60));
                for client in clients {
                    println!(
                        "{:<25} {:<12} {}",
                        truncate(&client.name, 25),
                        client.created_at.format("%Y-%m-%d"),
                        truncate(client.notes.as_deref().unwrap_or(""), 30)
                    );
                }
            }
        }

        ClientCommands::Show { name } => {
            let info = service.get_client_info(&name).await?;
            let client = &info.client;

            println!("Client: {}", client.name);
            println!("  ID:      {}", client.id);
            println!(
                "  Created: {}",
                client.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            if let Some(archived) = client.archived_at {
                println!("  Archived: {}", archived.format("%Y-%m-%d %H:%M:%S"));
            }
            if let Some(notes) = &client.notes {
                println!("  Notes:   {}", notes);
            }
            if !info.contacts.is_empty() {
                println!("  Contacts:");
                for contact in &info.contacts {
                    let mut line = contact.full_name.clone();
                    if let Some(position) = &contact.position {
                        line.push_str(&format!(" ({})", position));
                    }
                    if let Some(email) = &contact.email {
                        line.push_str(&format!(" <{}>", email));
                    }
                    if let Some(phone) = &contact.phone {
                        line.push_str(&format!(" {}", phone));
                    }
                    println!("    - {}", line);
                }
            }
        }

        ClientCommands::Contact {
            client,
            full_name,
            position,
            phone,
            email,
        } => {
            let contact = service
                .add_contact(&client, full_name, position, phone, email)
                .await?;
            println!("Added contact {} to {}", contact.full_name, client);
        }

        ClientCommands::Archive { name } => {
            service.archive_client(&name).await?;
            println!("Archived client: {}", name);
        }
    }
    Ok(())
}

async fn run_project_command(service: &CompanyService, cmd: ProjectCommands) -> Result<()> {
    match cmd {
        ProjectCommands::Add {
            name,
            client,
            description,
        } => {
            let project = service.create_project(name, description, &client).await?;
            println!("Created project: {} (client: {})", project.name, client);
        }

        ProjectCommands::List { all } => {
            let projects = service.list_projects(all).await?;
            if projects.is_empty() {
                println!("No projects found.");
            } else {
                println!("{:<25} {:<12} DESCRIPTION", "NAME", "SINCE");
                println!("{}", "-".repeat(60));
                for project in projects {
                    println!(
                        "{:<25} {:<12} {}",
                        truncate(&project.name, 25),
                        project.created_at.format("%Y-%m-%d"),
                        truncate(project.description.as_deref().unwrap_or(""), 30)
                    );
                }
            }
        }

        ProjectCommands::Archive { name } => {
            service.archive_project(&name).await?;
            println!("Archived project: {}", name);
        }
    }
    Ok(())
}

async fn run_order_command(service: &CompanyService, cmd: OrderCommands) -> Result<()> {
    match cmd {
        OrderCommands::Add {
            name,
            project,
            amount,
            payment_type,
            description,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '2500.00' or '2500'")?;
            let pt = PaymentType::from_str(&payment_type).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid payment type '{}'. Valid types: prepaid, postpaid, installments",
                    payment_type
                )
            })?;

            let order = service
                .create_order(name, description, amount_cents, pt, &project)
                .await?;
            println!(
                "Created order: {} ({}, {})",
                order.name,
                format_cents(order.amount),
                order.payment_type
            );
        }

        OrderCommands::List { all } => {
            let orders = service.list_orders(all).await?;
            if orders.is_empty() {
                println!("No orders found.");
            } else {
                println!(
                    "{:<25} {:>12} {:<14} {:<18} {:<12}",
                    "NAME", "AMOUNT", "STATUS", "PAYMENT", "TYPE"
                );
                println!("{}", "-".repeat(85));
                for order in orders {
                    println!(
                        "{:<25} {:>12} {:<14} {:<18} {:<12}",
                        truncate(&order.name, 25),
                        format_cents(order.amount),
                        order.order_status,
                        order.payment_status,
                        order.payment_type
                    );
                }
            }
        }

        OrderCommands::Show { name } => {
            let order = service.get_order(&name).await?;
            println!("Order: {}", order.name);
            println!("  ID:             {}", order.id);
            println!("  Amount:         {}", format_cents(order.amount));
            println!("  Status:         {}", order.order_status);
            println!("  Payment status: {}", order.payment_status);
            println!("  Payment type:   {}", order.payment_type);
            println!("  Project:        {}", order.project_id);
            if let Some(desc) = &order.description {
                println!("  Description:    {}", desc);
            }
            println!(
                "  Created:        {}",
                order.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            if let Some(archived) = order.archived_at {
                println!("  Archived:       {}", archived.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        OrderCommands::SetStatus { name, status } => {
            let parsed = OrderStatus::from_str(&status).ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid order status '{}'. Valid: new, in_progress, completed, done",
                    status
                )
            })?;
            service.set_order_status(&name, parsed).await?;
            println!("Order {} is now {}", name, parsed);
        }

        OrderCommands::Archive { name } => {
            service.archive_order(&name).await?;
            println!("Archived order: {}", name);
        }
    }
    Ok(())
}

async fn run_payment_command(service: &CompanyService, cmd: PaymentCommands) -> Result<()> {
    match cmd {
        PaymentCommands::Plan {
            order,
            amount,
            percent,
            date,
        } => {
            let plan = match (amount, percent) {
                (Some(amount), None) => {
                    let cents = parse_cents(&amount)
                        .context("Invalid amount format. Use '1000.00' or '1000'")?;
                    PaymentPlan::Amount(cents)
                }
                (None, Some(percent)) => PaymentPlan::Percent(percent),
                _ => anyhow::bail!("Provide exactly one of --amount or --percent"),
            };

            let planned_date = date.as_deref().map(parse_day).transpose()?;
            let payment = service.plan_payment(&order, plan, planned_date).await?;

            println!("Planned payment for {}: {}", order, payment.id);
            if let Some(amount) = payment.planned_amount {
                println!("  Amount: {}", format_cents(amount));
            }
            if let Some(percent) = payment.planned_amount_percent {
                println!("  Share:  {}% of order amount", percent);
            }
            if let Some(date) = payment.planned_date {
                println!("  Due:    {}", date);
            }
        }

        PaymentCommands::Pay { id, amount, date } => {
            let payment_id =
                Uuid::parse_str(&id).context("Invalid payment ID format (expected UUID)")?;
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '1000.00' or '1000'")?;
            let when = match date.as_deref() {
                Some(s) => parse_day(s)?,
                None => Utc::now().date_naive(),
            };

            let payment = service
                .record_actual_payment(payment_id, amount_cents, when)
                .await?;
            println!(
                "Recorded payment: {} on {}",
                format_cents(payment.actual_amount.unwrap_or(0)),
                when
            );
        }

        PaymentCommands::List { all } => {
            let records = service.list_payment_records(all).await?;
            if records.is_empty() {
                println!("No payments found.");
            } else {
                println!(
                    "{:<36} {:<20} {:>12} {:<12} {:>12} {:<12}",
                    "ID", "ORDER", "PLANNED", "DUE", "ACTUAL", "PAID"
                );
                println!("{}", "-".repeat(110));
                for record in records {
                    let planned = crate::domain::resolve_planned_amount(&record);
                    println!(
                        "{:<36} {:<20} {:>12} {:<12} {:>12} {:<12}",
                        record.id,
                        truncate(record.order_name.as_deref().unwrap_or("?"), 20),
                        if planned > 0 {
                            format_cents(planned)
                        } else {
                            String::new()
                        },
                        record
                            .planned_date
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                        record
                            .actual_amount
                            .filter(|a| *a > 0)
                            .map(format_cents)
                            .unwrap_or_default(),
                        record
                            .actual_date
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                    );
                }
            }
        }

        PaymentCommands::Archive { id } => {
            let payment_id =
                Uuid::parse_str(&id).context("Invalid payment ID format (expected UUID)")?;
            service.archive_payment(payment_id).await?;
            println!("Archived payment: {}", id);
        }
    }
    Ok(())
}

async fn run_dashboard_command(
    service: &CompanyService,
    limit: usize,
    format: &str,
    verbose: bool,
) -> Result<()> {
    let report = service.dashboard(limit).await?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        "table" => {}
        other => anyhow::bail!("Invalid format '{}'. Valid formats: table, json", other),
    }

    if verbose {
        eprintln!(
            "[dashboard] {} month bucket(s), {} recent payment(s)",
            report.revenue_by_month.months.len(),
            report.recent_payments.len()
        );
    }

    println!("Dashboard");
    println!(
        "Generated: {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!(
        "Total revenue:   {:>14}",
        format_cents(report.stats.total_revenue)
    );
    println!("Active clients:  {:>14}", report.stats.active_clients);
    println!("Active projects: {:>14}", report.stats.active_projects);
    println!("Active orders:   {:>14}", report.stats.active_orders);
    println!();

    println!("Revenue by month");
    if report.revenue_by_month.is_empty() {
        println!("  (no revenue data)");
    } else {
        println!("{:<18} {:>14} {:>14}", "MONTH", "PLANNED", "ACTUAL");
        println!("{}", "-".repeat(48));
        for bucket in &report.revenue_by_month.months {
            println!(
                "{:<18} {:>14} {:>14}",
                bucket.label(),
                format_cents(bucket.planned),
                format_cents(bucket.actual)
            );
        }
    }
    println!();

    println!("Recent payments");
    if report.recent_payments.is_empty() {
        println!("  (no payments)");
    } else {
        println!("{:<12} {:<25} {:>14}", "DATE", "ORDER", "AMOUNT");
        println!("{}", "-".repeat(53));
        for record in &report.recent_payments {
            println!(
                "{:<12} {:<25} {:>14}",
                record
                    .actual_date
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                truncate(record.order_name.as_deref().unwrap_or("?"), 25),
                format_cents(record.actual_amount.unwrap_or(0))
            );
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &CompanyService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "clients" => {
            let count = exporter.export_clients_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} clients", count);
            }
        }
        "orders" => {
            let count = exporter.export_orders_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} orders", count);
            }
        }
        "payments" => {
            let count = exporter.export_payments_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} payments", count);
            }
        }
        "dashboard" => {
            exporter.export_dashboard_json(writer, 5).await?;
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: clients, orders, payments, dashboard",
                export_type
            );
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

fn parse_day(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
