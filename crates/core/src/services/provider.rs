use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Binary not found at {0}")]
    MissingBinary(PathBuf),
    #[error("Failed to read dump file {path}: {source}")]
    DumpFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Dump tool error: {0}")]
    Tool(String),
}

/// Supplies the textual Objective-C metadata of a binary.
///
/// The analysis calls each method once per run and never retries.
pub trait DumpProvider: Send + Sync {
    /// Full runtime metadata dump (`otool -oV`).
    fn metadata_dump(&self, binary: &Path) -> Result<String, ProviderError>;
    /// Selector reference section (`otool -v -s __DATA __objc_selrefs`).
    fn selector_refs(&self, binary: &Path) -> Result<String, ProviderError>;
    fn name(&self) -> &'static str;
}

/// Shells out to otool.
///
/// The tool is taken from `otool_path`, then `MACHSWEEP_OTOOL`, then
/// `/usr/bin/otool`.
#[derive(Debug, Clone, Default)]
pub struct OtoolProvider {
    pub otool_path: Option<PathBuf>,
}

impl OtoolProvider {
    pub fn new(otool_path: Option<PathBuf>) -> Self {
        Self { otool_path }
    }

    pub fn resolved_path(&self) -> PathBuf {
        self.otool_path.clone().unwrap_or_else(resolve_otool_path)
    }
}

impl DumpProvider for OtoolProvider {
    fn metadata_dump(&self, binary: &Path) -> Result<String, ProviderError> {
        // Allow tests to feed a captured dump via env to avoid needing otool installed.
        if let Some(fake) = std::env::var_os("MACHSWEEP_FAKE_DUMP") {
            return read_dump_file(Path::new(&fake));
        }
        ensure_binary(binary)?;
        run_otool(&self.resolved_path(), &["-oV"], binary)
    }

    fn selector_refs(&self, binary: &Path) -> Result<String, ProviderError> {
        if let Some(fake) = std::env::var_os("MACHSWEEP_FAKE_SELREFS") {
            return read_dump_file(Path::new(&fake));
        }
        ensure_binary(binary)?;
        run_otool(&self.resolved_path(), &["-v", "-s", "__DATA", "__objc_selrefs"], binary)
    }

    fn name(&self) -> &'static str {
        "otool"
    }
}

/// Reads dumps captured ahead of time; the binary path is ignored.
///
/// Without a separate selector reference file the metadata dump doubles as
/// one, since `otool -oV` also prints `__objc_selrefs`.
#[derive(Debug, Clone)]
pub struct FileProvider {
    pub dump: PathBuf,
    pub selrefs: Option<PathBuf>,
}

impl FileProvider {
    pub fn new(dump: impl Into<PathBuf>, selrefs: Option<PathBuf>) -> Self {
        Self { dump: dump.into(), selrefs }
    }
}

impl DumpProvider for FileProvider {
    fn metadata_dump(&self, _binary: &Path) -> Result<String, ProviderError> {
        read_dump_file(&self.dump)
    }

    fn selector_refs(&self, _binary: &Path) -> Result<String, ProviderError> {
        read_dump_file(self.selrefs.as_deref().unwrap_or(&self.dump))
    }

    fn name(&self) -> &'static str {
        "files"
    }
}

/// Registry for dump providers; callers select by name.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Box<dyn DumpProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    pub fn register<P: DumpProvider + 'static>(&mut self, provider: P) -> &mut Self {
        self.providers.insert(provider.name().to_string(), Box::new(provider));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn DumpProvider> {
        self.providers.get(name).map(|p| &**p)
    }

    /// Return a sorted list of registered provider names for error messages/help.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Registry populated with the providers that need no extra arguments.
pub fn default_provider_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    registry.register(OtoolProvider::default());
    registry
}

fn resolve_otool_path() -> PathBuf {
    std::env::var_os("MACHSWEEP_OTOOL")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/usr/bin/otool"))
}

fn ensure_binary(binary: &Path) -> Result<(), ProviderError> {
    if binary.is_file() {
        Ok(())
    } else {
        Err(ProviderError::MissingBinary(binary.to_path_buf()))
    }
}

fn read_dump_file(path: &Path) -> Result<String, ProviderError> {
    fs::read_to_string(path)
        .map_err(|source| ProviderError::DumpFile { path: path.to_path_buf(), source })
}

fn run_otool(otool: &Path, args: &[&str], binary: &Path) -> Result<String, ProviderError> {
    debug!(tool = %otool.display(), ?args, binary = %binary.display(), "running otool");
    let output = Command::new(otool)
        .args(args)
        .arg(binary)
        .output()
        .map_err(|e| ProviderError::Tool(format!("failed to spawn {}: {e}", otool.display())))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::Tool(format!(
            "{} exited with {}: {}",
            otool.display(),
            output.status,
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
