use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use machsweep_core::config::{
    default_whitelist, load_whitelist_file, parse_whitelist_json, SweepConfig,
};

/// Combine config, `--whitelist-json` and `--whitelist-file` into one set.
///
/// Malformed input is rejected here, before any analysis starts.
pub fn resolve_whitelist(
    config: &SweepConfig,
    json: Option<&str>,
    file: Option<&Path>,
) -> Result<BTreeSet<String>> {
    let mut extra = Vec::new();
    if let Some(text) = json {
        extra.extend(parse_whitelist_json(text).context("Invalid --whitelist-json")?);
    }
    if let Some(path) = file {
        extra.extend(
            load_whitelist_file(path)
                .with_context(|| format!("Invalid whitelist file {}", path.display()))?,
        );
    }
    Ok(config.effective_whitelist(extra))
}

/// Print the built-in whitelist.
pub fn default_whitelist_command(json: bool) -> Result<()> {
    let selectors = default_whitelist();
    if json {
        println!("{}", serde_json::to_string_pretty(selectors)?);
        return Ok(());
    }

    println!("Default whitelist ({}):", selectors.len());
    for selector in selectors {
        println!("  - {selector}");
    }
    Ok(())
}
