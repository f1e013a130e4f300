use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use machsweep_core::analysis::Analyzer;
use machsweep_core::config::SweepConfig;
use machsweep_core::model::UnusedReport;
use machsweep_core::report::{ReportFormat, ReportMeta};
use machsweep_core::services::demangle::{
    CachingDemangler, Demangler, NoopDemangler, SwiftDemangler,
};
use machsweep_core::services::macho::verify_macho;
use machsweep_core::services::provider::{DumpProvider, FileProvider, OtoolProvider};
use tracing::info;

use crate::canonicalize_or_current;
use crate::commands::{emit_report, load_config, resolve_format, resolve_whitelist};
use crate::infer_binary_name;

/// Flags shared by `scan` and `analyze-dump`.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub whitelist_json: Option<String>,
    pub whitelist_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub no_default_whitelist: bool,
    pub no_demangle: bool,
    pub serial: bool,
}

/// Analyze a Mach-O binary with otool and emit the report.
pub fn scan_command(
    binary: &str,
    otool: Option<PathBuf>,
    options: &SweepOptions,
) -> Result<UnusedReport> {
    let mut config = load_config(options.config.as_deref())?;
    apply_flags(&mut config, options);
    // Validate the whitelist before touching the binary.
    let whitelist = whitelist_for(&config, options)?;

    let binary_path = canonicalize_or_current(binary)?;
    let verified = verify_macho(&binary_path).context("Input is not a usable Mach-O binary")?;
    if verified.is_staged() {
        info!(path = %verified.analyzed_path.display(), "analyzing a copy without spaces");
    }

    let provider = OtoolProvider::new(otool.or_else(|| config.otool_path.clone()));
    let report = run_sweep(&provider, &verified.analyzed_path, &config, whitelist)?;

    let meta = ReportMeta::now(verified.display_name(), Some(verified.sha256.clone()));
    let output = options.output.as_deref();
    emit_report(&report, &meta, resolve_format(options.format, &config, output), output)?;
    Ok(report)
}

/// Analyze dumps captured ahead of time (no Mach-O or otool needed).
pub fn analyze_dump_command(
    dump: &Path,
    selrefs: Option<&Path>,
    options: &SweepOptions,
) -> Result<UnusedReport> {
    let mut config = load_config(options.config.as_deref())?;
    apply_flags(&mut config, options);
    let whitelist = whitelist_for(&config, options)?;

    let provider = FileProvider::new(dump, selrefs.map(Path::to_path_buf));
    let report = run_sweep(&provider, dump, &config, whitelist)?;

    let meta = ReportMeta::now(infer_binary_name(dump), None);
    let output = options.output.as_deref();
    emit_report(&report, &meta, resolve_format(options.format, &config, output), output)?;
    Ok(report)
}

/// Fetch both dumps from `provider` and run the analysis.
pub fn run_sweep(
    provider: &dyn DumpProvider,
    binary: &Path,
    config: &SweepConfig,
    whitelist: BTreeSet<String>,
) -> Result<UnusedReport> {
    let dump = provider
        .metadata_dump(binary)
        .with_context(|| format!("{} failed to dump {}", provider.name(), binary.display()))?;
    let selrefs = provider.selector_refs(binary).with_context(|| {
        format!("{} failed to read selector references of {}", provider.name(), binary.display())
    })?;

    let demangler = build_demangler(config);
    let analyzer =
        Analyzer::new(demangler.as_ref()).with_whitelist(whitelist).parallel(config.parallel);
    Ok(analyzer.analyze(&dump, &selrefs))
}

fn build_demangler(config: &SweepConfig) -> Box<dyn Demangler> {
    if config.demangle {
        Box::new(CachingDemangler::new(SwiftDemangler::new(config.swift_demangle_path.clone())))
    } else {
        Box::new(NoopDemangler)
    }
}

fn apply_flags(config: &mut SweepConfig, options: &SweepOptions) {
    if options.no_default_whitelist {
        config.use_default_whitelist = false;
    }
    if options.no_demangle {
        config.demangle = false;
    }
    if options.serial {
        config.parallel = false;
    }
}

fn whitelist_for(
    config: &SweepConfig,
    options: &SweepOptions,
) -> Result<BTreeSet<String>> {
    resolve_whitelist(config, options.whitelist_json.as_deref(), options.whitelist_file.as_deref())
}
