//! Descriptor directory loading (SPEC_FULL.md §6.4): every `*.json` file in
//! the configured directory is parsed as a `GeneratorDescriptor` and
//! registered; malformed or invalid files are logged and skipped rather
//! than aborting boot, matching spec §7's "audio thread never aborts"
//! principle extended to boot-time loading.

use std::path::Path;

use sauce_core::descriptor::GeneratorDescriptor;
use sauce_core::registry::DescriptorRegistry;

use crate::errors::CliError;

/// Loads every descriptor in `dir` into a fresh registry. Returns an error
/// only if the directory itself can't be read; per-file problems are
/// logged via `tracing::warn!` and the file is skipped.
pub fn load_descriptor_dir(dir: &Path) -> Result<DescriptorRegistry, CliError> {
    let mut registry = DescriptorRegistry::default();

    let entries = std::fs::read_dir(dir)
        .map_err(|source| CliError::DescriptorDirRead { path: dir.display().to_string(), source })?;

    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to read descriptor file, skipping");
                continue;
            }
        };

        let descriptor: GeneratorDescriptor = match serde_json::from_str(&contents) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "failed to parse descriptor file, skipping");
                continue;
            }
        };

        let id = descriptor.id.clone();
        if let Err(err) = registry.register(descriptor) {
            tracing::warn!(path = %path.display(), %err, "descriptor failed validation, skipping");
        } else {
            tracing::info!(id, path = %path.display(), "loaded descriptor");
        }
    }

    Ok(registry)
}
