use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A row of the remote tickets table. Unknown columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ticket {
    #[serde(default, deserialize_with = "scalar_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "string_only")]
    pub screenshot_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub inserted_at: Option<DateTime<Utc>>,
    /// Older tables carry `created_at` instead of `inserted_at`.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn created(&self) -> Option<&DateTime<Utc>> {
        self.inserted_at.as_ref().or(self.created_at.as_ref())
    }

    pub fn screenshot_url(&self) -> Option<&str> {
        self.screenshot_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampStyle {
    #[default]
    Utc,
    Local,
}

impl TimestampStyle {
    pub fn format(self, at: &DateTime<Utc>) -> String {
        match self {
            TimestampStyle::Utc => format!("{} UTC", at.format("%Y-%m-%d %H:%M:%S")),
            TimestampStyle::Local => at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        }
    }
}

// Column types belong to the store, so a row whose values are not the expected
// JSON type loses that field rather than failing the whole response.

fn scalar_to_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn scalar_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(deserializer)?.unwrap_or_default())
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_text(Value::deserialize(deserializer)?))
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

// Postgres emits `2024-01-02T00:00:00+00:00` or, for `timestamp` without zone,
// `2024-01-02T00:00:00.123456`. Epoch integers and other shapes are dropped.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(raw) => Ok(parse_timestamp(&raw)),
        _ => Ok(None),
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
