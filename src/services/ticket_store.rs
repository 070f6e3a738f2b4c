use async_trait::async_trait;

use crate::domain::ticket::Ticket;
use crate::error::AppResult;

pub const DEFAULT_TABLE: &str = "tickets";
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "inserted_at";

/// A read of every column of one table, ordered by a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub table: String,
    pub order_by: String,
    pub descending: bool,
}

impl TicketQuery {
    pub fn newest_first(table: &str, timestamp_column: &str) -> Self {
        Self {
            table: table.to_string(),
            order_by: timestamp_column.to_string(),
            descending: true,
        }
    }
}

impl Default for TicketQuery {
    fn default() -> Self {
        Self::newest_first(DEFAULT_TABLE, DEFAULT_TIMESTAMP_COLUMN)
    }
}

/// Table and column names end up in the request path and query string, so only
/// plain identifiers (`[A-Za-z0-9_]+`) are accepted.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Returns rows in the order the store sorted them.
    async fn list_tickets(&self, query: &TicketQuery) -> AppResult<Vec<Ticket>>;
}
