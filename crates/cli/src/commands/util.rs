use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use machsweep_core::config::SweepConfig;
use machsweep_core::model::UnusedReport;
use machsweep_core::report::{render, ReportFormat, ReportMeta};

/// Load the sweep config from `explicit`, or from the default locations in the
/// current directory when no path is given.
pub fn load_config(explicit: Option<&Path>) -> Result<SweepConfig> {
    match explicit {
        Some(path) => SweepConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            SweepConfig::from_default_locations(&cwd)
                .with_context(|| format!("Failed to load config from {}", cwd.display()))
        }
    }
}

/// Pick the report format: explicit flag, then config, then output extension, then text.
pub fn resolve_format(
    flag: Option<ReportFormat>,
    config: &SweepConfig,
    output: Option<&Path>,
) -> ReportFormat {
    flag.or(config.report_format)
        .or_else(|| output.map(ReportFormat::from_path))
        .unwrap_or(ReportFormat::Text)
}

/// Render the report and write it to `output`, or print it to stdout.
pub fn emit_report(
    report: &UnusedReport,
    meta: &ReportMeta,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = render(format, meta, report).context("Failed to render report")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Unused methods: {}", report.unused_methods.len());
            println!("Unused classes: {}", report.unused_classes.len());
            println!("Report ({}) written to {}", format.as_str(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
