//! Output module
//!
//! Renders query results and property lists for the terminal.
//!
//! # Overview
//!
//! - `render_table` - ASCII grid for a `ResultSet`
//! - `render_pairs` - aligned label/value list
//! - `render` - either of the above or JSON, per `OutputFormat`

mod table;

pub use table::{render_pairs, render_table, NULL_TEXT};

use crate::warehouse::ResultSet;

/// How results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// ASCII tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Render a result set in the requested format
pub fn render(result: &ResultSet, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => render_table(result),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result.to_json()).unwrap_or_default()
        }
    }
}

/// Render label/value pairs in the requested format
pub fn render_properties(pairs: &[(&str, String)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => render_pairs(pairs),
        OutputFormat::Json => {
            let object: serde_json::Map<String, serde_json::Value> = pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), serde_json::Value::String(v.clone())))
                .collect();
            serde_json::to_string_pretty(&object).unwrap_or_default()
        }
    }
}
