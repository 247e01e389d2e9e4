use crate::error::{RegistryError, Result};

use super::defaults::MIN_GATEWAY_PORT;
use super::document::CustomModelSpec;
use once_cell::sync::Lazy;
use regex::Regex;

/// Profile and agent ids double as path components.
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid identifier regex"));

/// Check that `value` is a usable profile or agent identifier.
pub fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(())
    } else {
        Err(RegistryError::validation(format!(
            "{field} '{value}' may only contain letters, digits, '-' and '_'"
        )))
    }
}

/// Reject empty or whitespace-only required text fields.
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(RegistryError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Gateways may not claim privileged ports.
pub fn validate_port(port: u16) -> Result<()> {
    if port < MIN_GATEWAY_PORT {
        return Err(RegistryError::validation(format!(
            "port {port} is outside {MIN_GATEWAY_PORT}-65535"
        )));
    }
    Ok(())
}

/// All of id, base URL and API key must be present.
pub fn validate_custom_model(custom: &CustomModelSpec) -> Result<()> {
    require_non_empty("customModel.id", &custom.id)?;
    require_non_empty("customModel.baseUrl", &custom.base_url)?;
    require_non_empty("customModel.apiKey", &custom.api_key)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(validate_identifier("profileId", "tech-dev").is_ok());
        assert!(validate_identifier("agentId", "main_agent2").is_ok());
        assert!(validate_identifier("profileId", "").is_err());
        assert!(validate_identifier("profileId", "../etc").is_err());
        assert!(validate_identifier("profileId", "-leading").is_err());
        assert!(validate_identifier("profileId", "with space").is_err());
    }

    #[test]
    fn privileged_port_rejected() {
        assert!(validate_port(80).is_err());
        assert!(validate_port(1024).is_ok());
        assert!(validate_port(18789).is_ok());
    }

    #[test]
    fn custom_model_requires_all_fields() {
        let mut custom = CustomModelSpec {
            id: "gpt-4o".into(),
            base_url: "https://api.example.com/v1".into(),
            api_key: "sk-x".into(),
            api: None,
        };
        assert!(validate_custom_model(&custom).is_ok());

        custom.api_key = " ".into();
        let err = validate_custom_model(&custom).unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
        assert!(err.to_string().contains("customModel.apiKey"));
    }
}
