//! Rendering of an [`UnusedReport`] for people and tools.
//!
//! Rendering only produces strings; writing them anywhere is the caller's job.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::UnusedReport;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Html,
    Json,
    Text,
}

impl ReportFormat {
    /// Infer the format from an output file extension; anything unknown is text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("html") | Some("htm") => ReportFormat::Html,
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
        }
    }
}

/// Context printed alongside the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub binary_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_sha256: Option<String>,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    pub tool_version: String,
}

impl ReportMeta {
    /// Metadata stamped with the current time and library version.
    pub fn now(binary_name: impl Into<String>, binary_sha256: Option<String>) -> Self {
        Self {
            binary_name: binary_name.into(),
            binary_sha256,
            generated_at: Utc::now().to_rfc3339(),
            tool_version: crate::version().to_string(),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    meta: &'a ReportMeta,
    unused_class_count: usize,
    unused_method_count: usize,
    #[serde(flatten)]
    report: &'a UnusedReport,
}

/// Render in `format`.
pub fn render(
    format: ReportFormat,
    meta: &ReportMeta,
    report: &UnusedReport,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Html => Ok(render_html(meta, report)),
        ReportFormat::Json => render_json(meta, report),
        ReportFormat::Text => Ok(render_text(report)),
    }
}

/// Pretty JSON: metadata, counts and both lists.
pub fn render_json(meta: &ReportMeta, report: &UnusedReport) -> Result<String, ReportError> {
    let body = JsonReport {
        meta,
        unused_class_count: report.unused_classes.len(),
        unused_method_count: report.unused_methods.len(),
        report,
    };
    Ok(serde_json::to_string_pretty(&body)?)
}

/// Counts followed by one entry per line.
pub fn render_text(report: &UnusedReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Possibly unused methods ({}):\n", report.unused_methods.len()));
    for method in &report.unused_methods {
        out.push_str(&format!("  {method}\n"));
    }
    out.push_str(&format!("Possibly unused classes ({}):\n", report.unused_classes.len()));
    for class in &report.unused_classes {
        out.push_str(&format!("  {class}\n"));
    }
    out
}

/// Standalone HTML page with one table per result list.
pub fn render_html(meta: &ReportMeta, report: &UnusedReport) -> String {
    let mut html = String::new();
    html.push_str("<html>\n<head>\n");
    html.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">\n");
    html.push_str(&format!("<title>{} analysis results</title>\n", escape_html(&meta.binary_name)));
    html.push_str(
        "<style type=\"text/css\">\n\
         table { width: 100%; border-right: 1px solid #490; border-bottom: 1px solid #490; }\n\
         table td { border-left: 1px solid #490; border-top: 1px solid #490; }\n\
         </style>\n",
    );
    html.push_str("</head>\n<body>\n");

    html.push_str(&format!("<p>Generated {} by machsweep {}", meta.generated_at, meta.tool_version));
    if let Some(sha) = &meta.binary_sha256 {
        html.push_str(&format!(" (sha256 {})", escape_html(sha)));
    }
    html.push_str("</p>\n");

    push_table(&mut html, "Possibly unused methods", &report.unused_methods);
    push_table(&mut html, "Possibly unused classes", &report.unused_classes);

    html.push_str("</body>\n</html>\n");
    html
}

fn push_table(html: &mut String, title: &str, rows: &[String]) {
    html.push_str(&format!("<div><h2>{title} ({})</h2><table>\n", rows.len()));
    for row in rows {
        html.push_str(&format!("<tr><td>{}</td></tr>\n", escape_html(row)));
    }
    html.push_str("</table></div>\n");
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
