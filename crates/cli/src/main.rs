use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use machsweep::commands::{
    analyze_dump_command, default_whitelist_command, list_providers_command, scan_command,
    SweepOptions,
};
use machsweep::init_logging;
use machsweep_core::report::ReportFormat;

/// Finds Objective-C/Swift classes and selectors a Mach-O binary never references.
///
/// This CLI is a thin wrapper around `machsweep-core` (exposed in code as
/// `machsweep_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "machsweep",
    version,
    about = "Find unreferenced Objective-C/Swift classes and methods in Mach-O binaries",
    long_about = None
)]
struct Cli {
    /// Log debug details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dump a Mach-O binary with otool and report unused classes and methods.
    ///
    /// Results are heuristic: selectors used only through reflection or
    /// runtime-built strings show up as unused unless whitelisted.
    Scan {
        /// Path to the Mach-O binary.
        binary: String,

        /// Explicit otool executable (defaults to MACHSWEEP_OTOOL or /usr/bin/otool).
        #[arg(long)]
        otool: Option<PathBuf>,

        #[command(flatten)]
        sweep: SweepArgs,
    },

    /// Analyze `otool -oV` output captured ahead of time.
    AnalyzeDump {
        /// File holding `otool -oV <binary>` output.
        #[arg(long)]
        dump: PathBuf,

        /// File holding `otool -v -s __DATA __objc_selrefs <binary>` output.
        /// Defaults to the dump itself.
        #[arg(long)]
        selrefs: Option<PathBuf>,

        #[command(flatten)]
        sweep: SweepArgs,
    },

    /// List available dump providers.
    ListProviders {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the built-in selector whitelist.
    DefaultWhitelist {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Report file to write. Prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format. Inferred from the output extension when omitted.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Extra whitelisted selectors as a JSON array of strings.
    #[arg(long, value_name = "JSON")]
    whitelist_json: Option<String>,

    /// File holding extra whitelisted selectors (JSON array or YAML list).
    #[arg(long, value_name = "FILE")]
    whitelist_file: Option<PathBuf>,

    /// Config file (defaults to .machsweep.json/.yml in the current directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not include the built-in UIKit/WebKit delegate whitelist.
    #[arg(long, default_value_t = false)]
    no_default_whitelist: bool,

    /// Report Swift class names in their mangled form.
    #[arg(long, default_value_t = false)]
    no_demangle: bool,

    /// Parse class records on a single thread.
    #[arg(long, default_value_t = false)]
    serial: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Json,
    Text,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Html => ReportFormat::Html,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Text => ReportFormat::Text,
        }
    }
}

impl From<SweepArgs> for SweepOptions {
    fn from(args: SweepArgs) -> Self {
        SweepOptions {
            output: args.output,
            format: args.format.map(Into::into),
            whitelist_json: args.whitelist_json,
            whitelist_file: args.whitelist_file,
            config: args.config,
            no_default_whitelist: args.no_default_whitelist,
            no_demangle: args.no_demangle,
            serial: args.serial,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Scan { binary, otool, sweep } => {
            scan_command(&binary, otool, &sweep.into())?;
        }
        Command::AnalyzeDump { dump, selrefs, sweep } => {
            analyze_dump_command(&dump, selrefs.as_deref(), &sweep.into())?;
        }
        Command::ListProviders { json } => list_providers_command(json)?,
        Command::DefaultWhitelist { json } => default_whitelist_command(json)?,
    }

    Ok(())
}
