use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{TicketQuery, TicketStore};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub ticket_store: Arc<dyn TicketStore>,
}

impl AppContext {
    pub fn new(config: AppConfig, ticket_store: Arc<dyn TicketStore>) -> Self {
        Self {
            config,
            ticket_store,
        }
    }

    pub fn ticket_query(&self) -> TicketQuery {
        TicketQuery::newest_first(&self.config.table, &self.config.timestamp_column)
    }
}
