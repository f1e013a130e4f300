use std::fs;
use std::path::{Path, PathBuf};

use goblin::{mach, Object};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Binary not found at {0}")]
    Missing(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Not a Mach-O file: {0}")]
    NotMachO(PathBuf),
    #[error("Failed to stage {path} for analysis: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A Mach-O input ready to hand to the dump tool.
///
/// otool mishandles file names containing spaces, so such inputs are copied to
/// a temporary directory first; the copy lives as long as this value.
#[derive(Debug)]
pub struct VerifiedBinary {
    /// Path the caller supplied.
    pub original: PathBuf,
    /// Path to pass to the dump tool.
    pub analyzed_path: PathBuf,
    /// Hex SHA-256 of the file contents.
    pub sha256: String,
    /// Whether the image is a universal (fat) binary.
    pub is_fat: bool,
    staging: Option<TempDir>,
}

impl VerifiedBinary {
    /// File name of the original input, for report titles.
    pub fn display_name(&self) -> String {
        self.original
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.original.display().to_string())
    }

    pub fn is_staged(&self) -> bool {
        self.staging.is_some()
    }
}

/// Check that `path` is a readable thin or fat Mach-O image.
pub fn verify_macho(path: &Path) -> Result<VerifiedBinary, InputError> {
    if !path.is_file() {
        return Err(InputError::Missing(path.to_path_buf()));
    }
    let bytes = fs::read(path)
        .map_err(|source| InputError::Unreadable { path: path.to_path_buf(), source })?;

    let is_fat = match Object::parse(&bytes) {
        Ok(Object::Mach(mach::Mach::Binary(_))) => false,
        Ok(Object::Mach(mach::Mach::Fat(_))) => true,
        _ => return Err(InputError::NotMachO(path.to_path_buf())),
    };
    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    let (analyzed_path, staging) = stage_if_needed(path)?;
    Ok(VerifiedBinary {
        original: path.to_path_buf(),
        analyzed_path,
        sha256,
        is_fat,
        staging,
    })
}

fn stage_if_needed(path: &Path) -> Result<(PathBuf, Option<TempDir>), InputError> {
    let file_name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if name.contains(' ') => name,
        _ => return Ok((path.to_path_buf(), None)),
    };

    // Replace rather than strip spaces so the name can never end up empty.
    let staged_name = file_name.replace(' ', "_");
    let staging_err = |source| InputError::Staging { path: path.to_path_buf(), source };
    let dir = tempfile::tempdir().map_err(staging_err)?;
    let staged = dir.path().join(staged_name);
    fs::copy(path, &staged).map_err(staging_err)?;
    debug!(from = %path.display(), to = %staged.display(), "staged binary without spaces");
    Ok((staged, Some(dir)))
}
