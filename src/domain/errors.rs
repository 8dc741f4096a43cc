use serde::Serialize;
use thiserror::Error;

/// One cart line that cannot be fulfilled from live stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortfall {
    pub product_id: i32,
    pub name: String,
    pub requested: i32,
    pub available: i32,
}

impl std::fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Only {} of '{}' in stock (requested {})",
            self.available, self.name, self.requested
        )
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Insufficient stock: {}", format_shortfalls(.0))]
    InsufficientStock(Vec<StockShortfall>),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_shortfalls(items: &[StockShortfall]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
