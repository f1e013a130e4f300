use std::path::Path;

use machsweep_core::model::UnusedReport;
use machsweep_core::report::{render, render_html, render_json, render_text, ReportFormat, ReportMeta};

fn sample() -> (ReportMeta, UnusedReport) {
    let meta = ReportMeta {
        binary_name: "Sample<App>".into(),
        binary_sha256: Some("abc123".into()),
        generated_at: "2026-01-01T00:00:00+00:00".into(),
        tool_version: "0.1.0".into(),
    };
    let report = UnusedReport {
        unused_classes: vec!["Bar".into()],
        unused_methods: vec!["[Bar barMethod]".into(), "[Foo helper]".into()],
    };
    (meta, report)
}

#[test]
fn format_is_inferred_from_extension() {
    assert_eq!(ReportFormat::from_path(Path::new("out/report.html")), ReportFormat::Html);
    assert_eq!(ReportFormat::from_path(Path::new("REPORT.HTM")), ReportFormat::Html);
    assert_eq!(ReportFormat::from_path(Path::new("report.json")), ReportFormat::Json);
    assert_eq!(ReportFormat::from_path(Path::new("report.txt")), ReportFormat::Text);
    assert_eq!(ReportFormat::from_path(Path::new("report")), ReportFormat::Text);
}

#[test]
fn html_lists_both_tables_and_escapes_entries() {
    let (meta, report) = sample();
    let html = render_html(&meta, &report);
    assert!(html.contains("<title>Sample&lt;App&gt; analysis results</title>"));
    assert!(html.contains("Possibly unused methods (2)"));
    assert!(html.contains("Possibly unused classes (1)"));
    assert!(html.contains("<tr><td>[Bar barMethod]</td></tr>"));
    assert!(html.contains("sha256 abc123"));
}

#[test]
fn json_carries_meta_counts_and_lists() {
    let (meta, report) = sample();
    let body: serde_json::Value = serde_json::from_str(&render_json(&meta, &report).unwrap()).unwrap();
    assert_eq!(body["binary_name"], "Sample<App>");
    assert_eq!(body["unused_class_count"], 1);
    assert_eq!(body["unused_method_count"], 2);
    assert_eq!(body["unused_classes"][0], "Bar");
    assert_eq!(body["unused_methods"][1], "[Foo helper]");
}

#[test]
fn text_lists_counts_then_entries() {
    let (meta, report) = sample();
    let text = render_text(&report);
    assert!(text.starts_with("Possibly unused methods (2):\n  [Bar barMethod]\n"));
    assert!(text.ends_with("Possibly unused classes (1):\n  Bar\n"));
    assert_eq!(render(ReportFormat::Text, &meta, &report).unwrap(), text);
}

#[test]
fn empty_report_renders_empty_tables() {
    let (meta, _) = sample();
    let html = render_html(&meta, &UnusedReport::default());
    assert!(html.contains("Possibly unused methods (0)"));
    assert!(!html.contains("<tr>"));
}

#[test]
fn report_meta_now_stamps_version() {
    let meta = ReportMeta::now("SampleApp", None);
    assert_eq!(meta.tool_version, machsweep_core::version());
    assert!(!meta.generated_at.is_empty());
}
