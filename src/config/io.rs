use crate::error::{RegistryError, Result};

use super::document::ConfigDocument;
use std::io::ErrorKind;
use std::path::Path;

/// Maximum size for a config document (10 MB).
pub const MAX_CONFIG_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Parse a JSON5 configuration string.
pub fn parse_config_json5(content: &str) -> anyhow::Result<serde_json::Value> {
    let value: serde_json::Value = json5::from_str(content)?;
    Ok(value)
}

/// Read and parse a gateway configuration document.
///
/// A missing file is `NotFound`; an oversized or unparsable one is
/// `CorruptDocument`.
pub fn read_document(path: &Path) -> Result<ConfigDocument> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(RegistryError::not_found(format!(
                "config document '{}'",
                path.display()
            )))
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(RegistryError::not_found(format!(
            "config document '{}'",
            path.display()
        )));
    }

    if metadata.len() > MAX_CONFIG_FILE_BYTES {
        return Err(RegistryError::corrupt(
            path,
            format!(
                "{} bytes exceeds limit of {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_BYTES
            ),
        ));
    }

    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| RegistryError::corrupt(path, e))
}

/// Write a configuration document as pretty-printed JSON.
pub fn write_document(path: &Path, document: &ConfigDocument) -> Result<()> {
    let content = serde_json::to_string_pretty(document)
        .map_err(|e| RegistryError::corrupt(path, e))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Read a settings file, choosing the parser from its extension.
pub fn read_settings_value(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => parse_config_json5(&content),
    }
}

// ============================================================================
// Tests
// ============================================================================
