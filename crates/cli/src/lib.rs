use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod commands;

/// Canonicalize a user-supplied path if possible, falling back to the given
/// string relative to the current working directory.
pub fn canonicalize_or_current(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    if candidate == Path::new(".") {
        Ok(env::current_dir().context("Failed to get current directory")?)
    } else {
        // Try to canonicalize; if it fails (e.g., path does not exist),
        // join it with the current dir so error messages show an absolute path.
        match candidate.canonicalize() {
            Ok(p) => Ok(p),
            Err(_) => {
                let cwd = env::current_dir().context("Failed to get current directory")?;
                Ok(cwd.join(candidate))
            }
        }
    }
}

/// Infer a display name for a dump or binary from its path.
///
/// If the path has no final component (e.g., `/`), fallback to `unnamed-binary`.
pub fn infer_binary_name(path: &Path) -> String {
    path.file_name().and_then(|os_str| os_str.to_str()).unwrap_or("unnamed-binary").to_string()
}

/// Install the global tracing subscriber (stderr, so stdout stays parseable).
///
/// `RUST_LOG` wins over the flags when set.
pub fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let _ = fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).try_init();
}
