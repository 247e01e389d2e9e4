use crate::config::{
    require_non_empty, validate_custom_model, validate_identifier, validate_port, CustomModelSpec,
};
use crate::error::{RegistryError, Result};
use crate::lifecycle::RuntimeStatus;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Profiles
// ============================================================================

/// Summary of one installed gateway, derived from its configuration document
/// on every discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayProfile {
    pub id: String,
    /// Bot display name.
    pub name: String,
    pub port: u16,
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub config_path: PathBuf,
    /// Synthesized entry shown when nothing is installed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder: bool,
}

/// A profile joined with its runtime status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStatus {
    #[serde(flatten)]
    pub profile: GatewayProfile,
    #[serde(flatten)]
    pub status: RuntimeStatus,
}

// ============================================================================
// Requests
// ============================================================================

/// Which model an agent should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice<'a> {
    Preset(&'a str),
    Custom(&'a CustomModelSpec),
}

fn model_choice<'a>(
    model_id: Option<&'a str>,
    custom_model: Option<&'a CustomModelSpec>,
) -> Result<Option<ModelChoice<'a>>> {
    let model_id = model_id.filter(|m| !m.trim().is_empty());
    match (model_id, custom_model) {
        (Some(_), Some(_)) => Err(RegistryError::validation(
            "modelId and customModel are mutually exclusive",
        )),
        (Some(id), None) => Ok(Some(ModelChoice::Preset(id))),
        (None, Some(custom)) => {
            validate_custom_model(custom)?;
            Ok(Some(ModelChoice::Custom(custom)))
        }
        (None, None) => Ok(None),
    }
}

/// Fields of a new gateway profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGatewayRequest {
    pub profile_id: String,
    pub bot_name: String,
    pub port: u16,
    pub agent_id: String,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub custom_model: Option<CustomModelSpec>,
    pub app_id: String,
    pub app_secret: String,
    /// Persona text; the default template is written when absent.
    #[serde(default)]
    pub persona: Option<String>,
}

impl CreateGatewayRequest {
    /// Check required fields and resolve the model selection.
    pub fn validate(&self) -> Result<ModelChoice<'_>> {
        validate_identifier("profileId", &self.profile_id)?;
        validate_identifier("agentId", &self.agent_id)?;
        require_non_empty("botName", &self.bot_name)?;
        require_non_empty("appId", &self.app_id)?;
        require_non_empty("appSecret", &self.app_secret)?;
        validate_port(self.port)?;
        model_choice(self.model_id.as_deref(), self.custom_model.as_ref())?
            .ok_or_else(|| RegistryError::validation("either modelId or customModel is required"))
    }
}

/// Partial update of an existing profile. `None` leaves a value untouched.
///
/// `persona: Some("")` is a real overwrite with empty content; only an absent
/// field keeps the stored persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGatewayRequest {
    #[serde(default)]
    pub bot_name: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub custom_model: Option<CustomModelSpec>,
    #[serde(default)]
    pub app_id: Option<String>,
    /// Blank means "keep the stored secret".
    #[serde(default)]
    pub app_secret: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
}

impl UpdateGatewayRequest {
    /// Validate the supplied fields only.
    pub fn validate(&self) -> Result<Option<ModelChoice<'_>>> {
        if let Some(agent_id) = &self.agent_id {
            validate_identifier("agentId", agent_id)?;
        }
        if let Some(bot_name) = &self.bot_name {
            require_non_empty("botName", bot_name)?;
        }
        if let Some(app_id) = &self.app_id {
            require_non_empty("appId", app_id)?;
        }
        if let Some(port) = self.port {
            validate_port(port)?;
        }
        model_choice(self.model_id.as_deref(), self.custom_model.as_ref())
    }

    /// Secret to store, ignoring blank input.
    pub fn app_secret(&self) -> Option<&str> {
        self.app_secret.as_deref().filter(|s| !s.is_empty())
    }

    pub(crate) fn touches_account(&self) -> bool {
        self.bot_name.is_some() || self.app_id.is_some() || self.app_secret().is_some()
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub id: &'static str,
    pub name: &'static str,
}
