use crate::domain::model::Lead;
use crate::utils::error::Result;
use chrono::{DateTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("filename pattern is valid"));
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("underscore pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Formats selected by the `--json-only` / `--csv-only` flags. Passing both
/// still writes CSV so a run never ends without output.
pub fn output_formats(json_only: bool, csv_only: bool) -> Vec<OutputFormat> {
    match (json_only, csv_only) {
        (false, false) => vec![OutputFormat::Csv, OutputFormat::Json],
        (true, false) => vec![OutputFormat::Json],
        (false, true) => vec![OutputFormat::Csv],
        (true, true) => {
            tracing::info!("Both --json-only and --csv-only given; writing CSV by default");
            vec![OutputFormat::Csv]
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOrder {
    /// File exports: identifier first.
    Export,
    /// Web table and its download: contact details first.
    Display,
}

impl ColumnOrder {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ColumnOrder::Export => &[
                "place_id",
                "name",
                "formatted_address",
                "formatted_phone_number",
                "website",
                "url",
                "types",
                "business_status",
            ],
            ColumnOrder::Display => &[
                "name",
                "formatted_address",
                "formatted_phone_number",
                "website",
                "url",
                "place_id",
                "types",
                "business_status",
            ],
        }
    }
}

/// Safe filename fragment: whitespace runs become `_`, anything outside
/// `[A-Za-z0-9_]` is dropped, `_` runs collapse, edges are trimmed.
pub fn sanitize_filename_fragment(text: &str) -> String {
    let text = WHITESPACE_RUN.replace_all(text.trim(), "_");
    let text = DISALLOWED.replace_all(&text, "");
    let text = UNDERSCORE_RUN.replace_all(&text, "_");
    let text = text.trim_matches('_');
    if text.is_empty() {
        "search".to_string()
    } else {
        text.to_string()
    }
}

/// e.g. `Generator_Dealer_Atlanta_GA_2025-09-14_1512`
pub fn build_output_basename<Tz: TimeZone>(query: &str, location: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}",
        sanitize_filename_fragment(query),
        sanitize_filename_fragment(location),
        now.format("%Y-%m-%d_%H%M")
    )
}

pub fn download_filename(query: &str, location: &str) -> String {
    format!(
        "{}_{}.csv",
        sanitize_filename_fragment(query),
        sanitize_filename_fragment(location)
    )
}

/// CSV bytes with a UTF-8 BOM so spreadsheet apps detect the encoding.
pub fn leads_to_csv(leads: &[Lead], order: ColumnOrder) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    let columns = order.columns();
    writer.write_record(columns)?;
    for lead in leads {
        writer.write_record(columns.iter().map(|c| lead.field(c)))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::LeadError::IoError(e.into_error()))
}

pub fn leads_to_json(leads: &[Lead]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(leads)?)
}

pub fn render(leads: &[Lead], format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => leads_to_csv(leads, ColumnOrder::Export),
        OutputFormat::Json => leads_to_json(leads),
    }
}
