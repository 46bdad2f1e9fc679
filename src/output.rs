//! Output formatting for command results
//!
//! `OutputFormat` is shared by every CLI command. Rendering turns a list of
//! named columns plus JSON rows into text; both query results and the
//! connection list go through it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Unified output format for all commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// JSON Lines format (one row object per line)
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Check if this is a table variant
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::Markdown)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Cell text for a JSON value; strings are unquoted and null is blank
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render rows in `format`.
///
/// `columns` fixes the column order for table and PSV output; JSON output
/// emits the row objects as they are.
pub fn render_rows(
    columns: &[String],
    rows: &[Map<String, Value>],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let out = match format {
        OutputFormat::Table | OutputFormat::Markdown => render_table(columns, rows, format),
        OutputFormat::Json => serde_json::to_string(rows)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(rows)?,
        OutputFormat::JsonLine => rows
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
        OutputFormat::Psv => {
            let mut lines = vec![columns.join("|")];
            lines.extend(rows.iter().map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).map(cell_text).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join("|")
            }));
            lines.join("\n")
        }
    };
    Ok(out)
}

#[cfg(feature = "display")]
fn render_table(columns: &[String], rows: &[Map<String, Value>], format: OutputFormat) -> String {
    use tabled::builder::Builder;
    use tabled::settings::Style;

    if columns.is_empty() {
        return "(no rows)".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .map(|c| row.get(c).map(cell_text).unwrap_or_default()),
        );
    }

    let mut table = builder.build();
    match format {
        OutputFormat::Markdown => table.with(Style::markdown()),
        _ => table.with(Style::rounded()),
    };
    table.to_string()
}

#[cfg(not(feature = "display"))]
fn render_table(columns: &[String], rows: &[Map<String, Value>], _format: OutputFormat) -> String {
    render_rows(columns, rows, OutputFormat::Psv).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> (Vec<String>, Vec<Map<String, Value>>) {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![
            json!({"id": 1, "name": "a"}).as_object().cloned().unwrap(),
            json!({"id": 2, "name": null}).as_object().cloned().unwrap(),
        ];
        (columns, rows)
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            OutputFormat::from_str("table").unwrap(),
            OutputFormat::Table
        );
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert_eq!(
            OutputFormat::from_str("ndjson").unwrap(),
            OutputFormat::JsonLine
        );
        assert!(OutputFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_output_format_display_round_trips() {
        for name in OutputFormat::all_names() {
            let format = OutputFormat::from_str(name).unwrap();
            assert_eq!(&format.to_string(), name);
        }
    }

    #[test]
    fn test_render_psv() {
        let (columns, rows) = sample();
        let out = render_rows(&columns, &rows, OutputFormat::Psv).unwrap();
        assert_eq!(out, "id|name\n1|a\n2|");
    }

    #[test]
    fn test_render_json_line() {
        let (columns, rows) = sample();
        let out = render_rows(&columns, &rows, OutputFormat::JsonLine).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines, vec![r#"{"id":1,"name":"a"}"#, r#"{"id":2,"name":null}"#]);
    }

    #[cfg(feature = "display")]
    #[test]
    fn test_render_markdown() {
        let (columns, rows) = sample();
        let out = render_rows(&columns, &rows, OutputFormat::Markdown).unwrap();
        assert!(out.lines().next().unwrap().contains("id"));
        assert!(out.contains("| 1"));
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn test_render_empty() {
        let out = render_rows(&[], &[], OutputFormat::Json).unwrap();
        assert_eq!(out, "[]");
    }
}
