use anyhow::Result;
use serde::Serialize;

use machsweep_core::services::provider::default_provider_registry;

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub name: String,
    pub description: String,
}

/// List dump providers known to this binary.
pub fn list_providers_command(json: bool) -> Result<()> {
    let registry = default_provider_registry();
    let mut entries: Vec<ProviderInfo> = registry
        .names()
        .into_iter()
        .map(|name| {
            let description = match name.as_str() {
                "otool" => "Runs `otool -oV` and `otool -v -s __DATA __objc_selrefs` \
                            (override with MACHSWEEP_OTOOL)"
                    .to_string(),
                other => format!("Provider '{}'", other),
            };
            ProviderInfo { name: name.clone(), description }
        })
        .collect();
    entries.push(ProviderInfo {
        name: "files".into(),
        description: "Pre-captured dump files (used by `analyze-dump`)".into(),
    });
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Providers:");
    for entry in entries {
        println!("- {}: {}", entry.name, entry.description);
    }

    Ok(())
}
