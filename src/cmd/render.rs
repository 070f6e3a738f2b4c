use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::context::AppContext;
use crate::domain::document::Document;
use crate::domain::ticket::TimestampStyle;
use crate::error::{AppError, AppResult};
use crate::workflow::render::{RenderOutcome, TicketListRenderer};

const PAGE_TITLE: &str = "Tickets";

#[derive(Debug, Clone, Default)]
pub struct RenderCommandArgs {
    pub output: Option<PathBuf>,
    pub fragment: bool,
    pub timestamps: TimestampStyle,
}

/// Builds the page, renders tickets into its container and writes the HTML.
pub async fn run(ctx: &AppContext, args: RenderCommandArgs) -> AppResult<RenderOutcome> {
    let (html, outcome) = render_page(ctx, args.fragment, args.timestamps).await?;

    match &args.output {
        Some(path) => {
            fs::write(path, &html)?;
            tracing::info!(path = %path.display(), "page written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(outcome)
}

pub async fn render_page(
    ctx: &AppContext,
    fragment: bool,
    timestamps: TimestampStyle,
) -> AppResult<(String, RenderOutcome)> {
    let container_id = ctx.config.container_id.as_str();
    let mut document = Document::with_container(PAGE_TITLE, container_id);
    let container = document.get_element_by_id_mut(container_id).ok_or_else(|| {
        AppError::Configuration(format!("container #{container_id} not found in page"))
    })?;

    let renderer = TicketListRenderer::new(ctx.ticket_store.clone(), ctx.ticket_query(), timestamps);
    let outcome = renderer.render(container).await;

    let html = if fragment {
        container.to_html()
    } else {
        document.to_html()
    };
    Ok((html, outcome))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::domain::ticket::Ticket;
    use crate::services::{TicketQuery, TicketStore};

    struct OneTicket;

    #[async_trait]
    impl TicketStore for OneTicket {
        async fn list_tickets(&self, _query: &TicketQuery) -> AppResult<Vec<Ticket>> {
            Ok(vec![Ticket {
                title: "Login <broken>".to_string(),
                ..Ticket::default()
            }])
        }
    }

    fn context(container_id: &str) -> AppContext {
        let config = AppConfig {
            supabase_url: "https://abc.supabase.co".to_string(),
            supabase_anon_key: "anon".to_string(),
            table: "tickets".to_string(),
            timestamp_column: "inserted_at".to_string(),
            container_id: container_id.to_string(),
        };
        AppContext::new(config, Arc::new(OneTicket))
    }

    #[tokio::test]
    async fn renders_full_page_around_container() {
        let (html, outcome) = render_page(&context("tickets"), false, TimestampStyle::Utc)
            .await
            .unwrap();

        assert_eq!(outcome, RenderOutcome::Rendered(1));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(
            "<div id=\"tickets\"><div class=\"ticket\"><h2>Login &lt;broken&gt;</h2><p>(no description)</p></div></div>"
        ));
    }

    #[tokio::test]
    async fn fragment_contains_only_container() {
        let (html, _) = render_page(&context("board"), true, TimestampStyle::Utc)
            .await
            .unwrap();

        assert!(html.starts_with("<div id=\"board\">"));
        assert!(!html.contains("<html"));
    }
}
