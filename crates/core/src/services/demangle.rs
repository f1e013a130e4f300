use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Mutex;

use tracing::debug;

/// Turns a mangled class name into a human-readable one.
///
/// `None` means "no better name available"; callers keep the raw token.
/// Demangling failures are never errors.
pub trait Demangler: Send + Sync {
    fn demangle(&self, mangled: &str) -> Option<String>;
}

/// Demangle `raw`, falling back to the raw token unchanged.
pub fn resolve_class_name(demangler: &dyn Demangler, raw: &str) -> String {
    match demangler.demangle(raw) {
        Some(name) if !name.is_empty() => name,
        _ => raw.to_string(),
    }
}

/// True for names the Swift runtime mangles when exposing classes to Objective-C.
pub fn looks_swift_mangled(name: &str) -> bool {
    name.starts_with("_Tt") || name.starts_with("$s") || name.starts_with("_$s")
}

/// Leaves every name untouched.
pub struct NoopDemangler;

impl Demangler for NoopDemangler {
    fn demangle(&self, _mangled: &str) -> Option<String> {
        None
    }
}

/// Fixed mangled -> readable table.
#[derive(Debug, Clone, Default)]
pub struct StaticDemangler {
    names: HashMap<String, String>,
}

impl StaticDemangler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mangled: impl Into<String>, demangled: impl Into<String>) -> Self {
        self.names.insert(mangled.into(), demangled.into());
        self
    }
}

impl Demangler for StaticDemangler {
    fn demangle(&self, mangled: &str) -> Option<String> {
        self.names.get(mangled).cloned()
    }
}

/// Shells out to `xcrun swift-demangle --compact <name>`.
///
/// Only Swift-looking names are sent to the tool. The executable is taken from
/// `swift_demangle_path`, then `MACHSWEEP_SWIFT_DEMANGLE` (a direct
/// `swift-demangle` binary), then `xcrun`.
#[derive(Debug, Clone, Default)]
pub struct SwiftDemangler {
    pub swift_demangle_path: Option<PathBuf>,
}

impl SwiftDemangler {
    pub fn new(swift_demangle_path: Option<PathBuf>) -> Self {
        Self { swift_demangle_path }
    }

    fn command(&self) -> Command {
        let direct = self
            .swift_demangle_path
            .clone()
            .or_else(|| std::env::var_os("MACHSWEEP_SWIFT_DEMANGLE").map(PathBuf::from));
        match direct {
            Some(tool) => {
                let mut cmd = Command::new(tool);
                cmd.arg("--compact");
                cmd
            }
            None => {
                let mut cmd = Command::new("xcrun");
                cmd.args(["swift-demangle", "--compact"]);
                cmd
            }
        }
    }
}

impl Demangler for SwiftDemangler {
    fn demangle(&self, mangled: &str) -> Option<String> {
        if !looks_swift_mangled(mangled) {
            return None;
        }
        let output = match self.command().arg(mangled).output() {
            Ok(output) => output,
            Err(e) => {
                debug!(name = mangled, "failed to spawn swift-demangle: {e}");
                return None;
            }
        };
        if !output.status.success() {
            debug!(name = mangled, "swift-demangle exited with {}", output.status);
            return None;
        }
        let demangled = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if demangled.is_empty() {
            debug!(name = mangled, "swift-demangle produced no output");
            None
        } else {
            Some(demangled)
        }
    }
}

/// Memoizes another demangler so each name is resolved once per run.
pub struct CachingDemangler<D> {
    inner: D,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl<D: Demangler> CachingDemangler<D> {
    pub fn new(inner: D) -> Self {
        Self { inner, cache: Mutex::new(HashMap::new()) }
    }

    /// Number of distinct names seen so far.
    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<D: Demangler> Demangler for CachingDemangler<D> {
    fn demangle(&self, mangled: &str) -> Option<String> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(mangled) {
                return hit.clone();
            }
        }
        let resolved = self.inner.demangle(mangled);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(mangled.to_string(), resolved.clone());
        }
        resolved
    }
}
