use std::sync::Arc;

use crate::domain::document::Element;
use crate::domain::ticket::{Ticket, TimestampStyle};
use crate::services::{TicketQuery, TicketStore};

pub const EMPTY_MESSAGE: &str = "No tickets found.";
pub const DESCRIPTION_PLACEHOLDER: &str = "(no description)";
const SCREENSHOT_ALT: &str = "Ticket screenshot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(usize),
    Empty,
    Failed(String),
}

/// Replaces a container's content with one card per ticket, newest first.
pub struct TicketListRenderer {
    store: Arc<dyn TicketStore>,
    query: TicketQuery,
    timestamps: TimestampStyle,
}

impl TicketListRenderer {
    pub fn new(store: Arc<dyn TicketStore>, query: TicketQuery, timestamps: TimestampStyle) -> Self {
        Self {
            store,
            query,
            timestamps,
        }
    }

    pub async fn render(&self, container: &mut Element) -> RenderOutcome {
        container.clear();

        let tickets = match self.store.list_tickets(&self.query).await {
            Ok(tickets) => tickets,
            Err(err) => {
                let message = err.to_string();
                tracing::error!(table = %self.query.table, error = %message, "error loading tickets");
                container.append(
                    Element::new("p")
                        .with_class("status status--error")
                        .with_text(format!("Error loading tickets: {message}")),
                );
                return RenderOutcome::Failed(message);
            }
        };

        if tickets.is_empty() {
            tracing::info!(table = %self.query.table, "no tickets to render");
            container.append(
                Element::new("p")
                    .with_class("status status--empty")
                    .with_text(EMPTY_MESSAGE),
            );
            return RenderOutcome::Empty;
        }

        for ticket in &tickets {
            container.append(self.card(ticket));
        }
        tracing::info!(count = tickets.len(), "rendered tickets");
        RenderOutcome::Rendered(tickets.len())
    }

    fn card(&self, ticket: &Ticket) -> Element {
        let mut card = Element::new("div")
            .with_class("ticket")
            .with_child(Element::new("h2").with_text(ticket.title.as_str()))
            .with_child(
                Element::new("p").with_text(ticket.description().unwrap_or(DESCRIPTION_PLACEHOLDER)),
            );

        if let Some(url) = ticket.screenshot_url() {
            card.append(
                Element::new("img")
                    .with_attr("src", url)
                    .with_attr("alt", SCREENSHOT_ALT)
                    .with_class("screenshot"),
            );
        }

        if let Some(at) = ticket.created() {
            card.append(
                Element::new("small").with_text(self.timestamps.format(at)),
            );
        }

        card
    }
}
