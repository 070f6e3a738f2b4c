use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use crate::config::{DEFAULT_CONTAINER_ID, StoredConfig, config_file_path};
use crate::error::AppResult;
use crate::services::ticket_store::{DEFAULT_TABLE, DEFAULT_TIMESTAMP_COLUMN};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration (anon key masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "Configuring ticketboard.")?;
    writeln!(stdout, "Press Enter to keep the current value, '-' to clear it.")?;
    writeln!(
        stdout,
        "The anon key is stored in the local config file; protect your filesystem accordingly.\n"
    )?;

    edit_config(&mut cfg, &mut stdin.lock(), &mut stdout)?;
    cfg.save()?;

    let path = config_file_path()?;
    writeln!(stdout, "\nConfiguration saved to {}", path.display())?;
    Ok(())
}

/// One prompt per stored field, in file order.
fn wizard_fields(cfg: &mut StoredConfig) -> [WizardField<'_>; 5] {
    [
        WizardField::plain(
            "Supabase project URL (e.g., https://xyz.supabase.co)",
            &mut cfg.supabase_url,
        ),
        WizardField::secret("Supabase anon key", &mut cfg.supabase_anon_key),
        WizardField::plain("Tickets table", &mut cfg.table),
        WizardField::plain(
            "Timestamp column (inserted_at or created_at)",
            &mut cfg.timestamp_column,
        ),
        WizardField::plain("Container element id", &mut cfg.container_id),
    ]
}

fn edit_config<R, W>(cfg: &mut StoredConfig, input: &mut R, output: &mut W) -> AppResult<()>
where
    R: BufRead,
    W: Write,
{
    for field in wizard_fields(cfg) {
        field.ask(input, output)?;
    }
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;

    println!("Configuration file: {}", path.display());
    for line in describe(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn describe(cfg: &StoredConfig) -> Vec<String> {
    vec![
        format!("Supabase URL: {}", display_value(&cfg.supabase_url, None)),
        format!("Supabase anon key: {}", mask_secret(&cfg.supabase_anon_key)),
        format!("Table: {}", display_value(&cfg.table, Some(DEFAULT_TABLE))),
        format!(
            "Timestamp column: {}",
            display_value(&cfg.timestamp_column, Some(DEFAULT_TIMESTAMP_COLUMN))
        ),
        format!(
            "Container id: {}",
            display_value(&cfg.container_id, Some(DEFAULT_CONTAINER_ID))
        ),
    ]
}

struct WizardField<'a> {
    label: &'static str,
    value: &'a mut Option<String>,
    secret: bool,
}

impl<'a> WizardField<'a> {
    fn plain(label: &'static str, value: &'a mut Option<String>) -> Self {
        Self {
            label,
            value,
            secret: false,
        }
    }

    fn secret(label: &'static str, value: &'a mut Option<String>) -> Self {
        Self {
            label,
            value,
            secret: true,
        }
    }

    fn ask<R: BufRead, W: Write>(self, input: &mut R, output: &mut W) -> AppResult<()> {
        let label = self.label;
        match (self.value.as_deref(), self.secret) {
            (Some(_), true) => write!(output, "{label} [****] (Enter to keep, '-' to clear): ")?,
            (Some(current), false) => {
                write!(output, "{label} [{current}] (Enter to keep, '-' to clear): ")?
            }
            (None, _) => write!(output, "{label} (Enter to skip): ")?,
        }
        output.flush()?;

        let mut line = String::new();
        input.read_line(&mut line)?;
        match PromptAction::parse(&line) {
            PromptAction::Keep => {}
            PromptAction::Clear => *self.value = None,
            PromptAction::Set(value) => *self.value = Some(value),
        }
        Ok(())
    }
}

fn display_value(value: &Option<String>, default: Option<&str>) -> String {
    match (value.as_deref().filter(|v| !v.is_empty()), default) {
        (Some(v), _) => v.to_string(),
        (None, Some(default)) => format!("<default: {default}>"),
        (None, None) => "<not set>".to_string(),
    }
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}

impl PromptAction {
    fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            PromptAction::Keep
        } else if trimmed == "-" {
            PromptAction::Clear
        } else {
            PromptAction::Set(trimmed.to_string())
        }
    }
}
