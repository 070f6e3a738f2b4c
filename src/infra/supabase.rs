use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;

use crate::domain::ticket::Ticket;
use crate::error::{AppError, AppResult};
use crate::services::ticket_store::is_identifier;
use crate::services::{TicketQuery, TicketStore};

/// Reads tables through the PostgREST API a Supabase project exposes.
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self::with_client(Client::new(), base_url, anon_key)
    }

    pub fn with_client(http: Client, base_url: String, anon_key: String) -> Self {
        Self {
            http,
            base_url,
            anon_key,
        }
    }

    fn table_endpoint(base_url: &str, table: &str) -> String {
        format!("{}/rest/v1/{table}", base_url.trim_end_matches('/'))
    }

    fn query_params(query: &TicketQuery) -> [(&'static str, String); 2] {
        let direction = if query.descending { "desc" } else { "asc" };
        [
            ("select", "*".to_string()),
            ("order", format!("{}.{direction}", query.order_by)),
        ]
    }

    fn failure_message(status: StatusCode, body: &str) -> String {
        match serde_json::from_str::<PostgrestError>(body) {
            Ok(PostgrestError {
                message: Some(message),
            }) if !message.trim().is_empty() => message,
            _ => {
                let body = body.trim();
                if body.is_empty() {
                    format!("Supabase responded with {status}")
                } else {
                    format!("Supabase responded with {status}: {body}")
                }
            }
        }
    }
}

#[async_trait]
impl TicketStore for SupabaseClient {
    async fn list_tickets(&self, query: &TicketQuery) -> AppResult<Vec<Ticket>> {
        if !is_identifier(&query.table) {
            return Err(AppError::Configuration(format!(
                "invalid table name {:?}",
                query.table
            )));
        }
        if !is_identifier(&query.order_by) {
            return Err(AppError::Configuration(format!(
                "invalid order column {:?}",
                query.order_by
            )));
        }

        let endpoint = Self::table_endpoint(&self.base_url, &query.table);
        tracing::debug!(%endpoint, order = %query.order_by, "querying tickets");

        let response = self
            .http
            .get(&endpoint)
            .query(&Self::query_params(query))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::RemoteRead(format!("failed to call Supabase: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::RemoteRead(Self::failure_message(status, &body)));
        }

        let rows: Vec<Ticket> = response.json().await.map_err(|err| {
            AppError::RemoteRead(format!("failed to parse Supabase response: {err}"))
        })?;
        tracing::debug!(rows = rows.len(), "tickets received");
        Ok(rows)
    }
}

#[derive(Deserialize)]
struct PostgrestError {
    message: Option<String>,
}
