//! Rendering an [`Analysis`] for stdout.
//!
//! Text output is the model's reply and nothing else, so it can be piped.
//! JSON output carries the full record.

use crate::types::Analysis;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The response text only
    #[default]
    Text,
    /// The full analysis record as a JSON object
    Json,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render an analysis as a string, without a trailing newline.
pub fn render(analysis: &Analysis, format: OutputFormat, pretty: bool) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(analysis.text.clone()),
        OutputFormat::Json if pretty => serde_json::to_string_pretty(analysis),
        OutputFormat::Json => serde_json::to_string(analysis),
    }
}

/// Write a rendered analysis followed by a newline.
pub fn write<W: Write>(
    writer: &mut W,
    analysis: &Analysis,
    format: OutputFormat,
    pretty: bool,
) -> io::Result<()> {
    let rendered = render(analysis, format, pretty).map_err(io::Error::other)?;
    writeln!(writer, "{rendered}")?;
    writer.flush()
}
