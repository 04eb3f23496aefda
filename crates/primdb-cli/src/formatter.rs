//! Output formatting for command results.
//!
//! Supports table, JSON, CSV, and raw output formats.

use comfy_table::{Cell, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use primdb_common::types::{Row, Value};
use primdb_sql::{QueryResult, StatementResult};

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Formatted table output.
    #[default]
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
    /// Raw output (values separated by tabs).
    Raw,
}

/// Formats a command result for printing.
///
/// Non-empty `select` results are rendered in `format`; everything else is
/// its confirmation message.
pub fn format_statement(result: &StatementResult, format: OutputFormat) -> String {
    match result {
        StatementResult::Query(query) if !query.is_empty() => format_result(query, format),
        other => other.message(),
    }
}

/// Formats a query result according to the specified format.
pub fn format_result(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => format_table(result),
        OutputFormat::Json => format_json(result),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Raw => format_raw(result),
    }
}

/// Values of a row in schema order; missing fields render empty.
fn row_cells(result: &QueryResult, row: &Row) -> Vec<String> {
    result
        .column_names()
        .into_iter()
        .map(|column| row.get(column).map(Value::to_string).unwrap_or_default())
        .collect()
}

/// Formats the result as a table.
fn format_table(result: &QueryResult) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    table.set_header(result.column_names().into_iter().map(Cell::new));

    for row in result.rows.iter() {
        table.add_row(row_cells(result, row).into_iter().map(Cell::new));
    }

    table.to_string()
}

/// Formats the result as JSON.
fn format_json(result: &QueryResult) -> String {
    let rows: Vec<JsonValue> = result
        .rows
        .iter()
        .map(|row| {
            let obj = result
                .column_names()
                .into_iter()
                .filter_map(|column| {
                    let value = serde_json::to_value(row.get(column)?).ok()?;
                    Some((column.to_string(), value))
                })
                .collect();
            JsonValue::Object(obj)
        })
        .collect();

    serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
}

/// Formats the result as CSV.
fn format_csv(result: &QueryResult) -> String {
    let mut output = String::new();

    let header: Vec<String> = result
        .column_names()
        .into_iter()
        .map(escape_csv)
        .collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in result.rows.iter() {
        let values: Vec<String> = row_cells(result, row)
            .iter()
            .map(|v| escape_csv(v))
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

/// Escapes a value for CSV output.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats the result as raw tab-separated values.
fn format_raw(result: &QueryResult) -> String {
    let mut output = String::new();

    output.push_str(&result.column_names().join("\t"));
    output.push('\n');

    for row in result.rows.iter() {
        output.push_str(&row_cells(result, row).join("\t"));
        output.push('\n');
    }

    output
}
