use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Client is archived: {0}")]
    ClientArchived(String),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Project is archived: {0}")]
    ProjectArchived(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order is archived: {0}")]
    OrderArchived(String),

    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid percentage: {0} (must be above 0 and at most 100)")]
    InvalidPercent(f64),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
