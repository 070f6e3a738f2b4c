pub mod ticket_store;

pub use ticket_store::{TicketQuery, TicketStore};
