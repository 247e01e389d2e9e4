//! Configuration and persona documents of gateway profiles.
//!
//! Documents are only ever changed by loading the whole file, merging, and
//! writing it back. Config and persona writes are sequential, not atomic as
//! a pair.

use crate::config::{
    read_document, write_document, AccountEntry, AgentEntry, ConfigDocument, ModelRef,
    DEFAULT_ACCOUNT_ID, DEFAULT_PERSONA, UNKNOWN_AGENT_ID,
};
use crate::error::{RegistryError, Result};

use super::layout::ProfileLayout;
use super::types::{CreateGatewayRequest, GatewayProfile, ModelChoice, UpdateGatewayRequest};
use serde_json::Map;
use std::path::PathBuf;
use tracing::{debug, info};

pub struct ConfigStore {
    layout: ProfileLayout,
    global_config_path: PathBuf,
    channel_provider: String,
}

impl ConfigStore {
    pub fn new(
        layout: ProfileLayout,
        global_config_path: impl Into<PathBuf>,
        channel_provider: impl Into<String>,
    ) -> Self {
        Self {
            layout,
            global_config_path: global_config_path.into(),
            channel_provider: channel_provider.into(),
        }
    }

    pub fn layout(&self) -> &ProfileLayout {
        &self.layout
    }

    pub fn channel_provider(&self) -> &str {
        &self.channel_provider
    }

    /// Whether the profile directory exists.
    pub fn exists(&self, profile_id: &str) -> Result<bool> {
        Ok(self.layout.profile_dir(profile_id)?.is_dir())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn read(&self, profile_id: &str) -> Result<ConfigDocument> {
        if !self.exists(profile_id)? {
            return Err(RegistryError::not_found(format!(
                "gateway profile '{profile_id}'"
            )));
        }
        read_document(&self.layout.config_path(profile_id)?)
    }

    /// Persona text, or the default template when none has been written.
    pub fn read_persona(&self, profile_id: &str, agent_id: &str) -> String {
        let content = self
            .layout
            .persona_path(profile_id, agent_id)
            .ok()
            .and_then(|path| std::fs::read_to_string(path).ok());

        match content {
            Some(content) => content,
            None => {
                debug!(
                    "No persona for {}/{}, using default template",
                    profile_id, agent_id
                );
                DEFAULT_PERSONA.to_string()
            }
        }
    }

    /// Overwrite the persona document, including with empty content.
    pub fn write_persona(&self, profile_id: &str, agent_id: &str, content: &str) -> Result<()> {
        let path = self.layout.persona_path(profile_id, agent_id)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Install a new profile.
    ///
    /// `registry_view` is the current (possibly cached) list of profiles and
    /// is the only source consulted for port conflicts.
    pub fn create(
        &self,
        request: &CreateGatewayRequest,
        registry_view: &[GatewayProfile],
    ) -> Result<ConfigDocument> {
        let model = request.validate()?;
        let profile_id = request.profile_id.as_str();
        let profile_dir = self.layout.profile_dir(profile_id)?;

        if profile_dir.exists() {
            return Err(RegistryError::AlreadyExists(profile_id.to_string()));
        }
        ensure_port_free(request.port, None, registry_view)?;

        let mut document = self.base_template(request.port)?;
        let model_ref = match model {
            ModelChoice::Preset(id) => id.to_string(),
            ModelChoice::Custom(custom) => document.apply_custom_model(custom),
        };

        document.gateway.port = Some(request.port);
        document.set_single_account(
            &self.channel_provider,
            DEFAULT_ACCOUNT_ID,
            AccountEntry {
                app_id: Some(request.app_id.clone()),
                app_secret: Some(request.app_secret.clone()),
                bot_name: Some(request.bot_name.clone()),
                enabled: Some(true),
                extra: Map::new(),
            },
        );
        document.agents.list = vec![AgentEntry {
            id: request.agent_id.clone(),
            model: Some(ModelRef::Named(model_ref)),
            extra: Map::new(),
        }];

        std::fs::create_dir_all(&profile_dir)?;
        write_document(&self.layout.config_path(profile_id)?, &document)?;

        let persona = request.persona.as_deref().unwrap_or(DEFAULT_PERSONA);
        self.write_persona(profile_id, &request.agent_id, persona)?;

        info!(
            "Created gateway profile {} on port {}",
            profile_id, request.port
        );
        Ok(document)
    }

    /// Apply a partial update to an existing profile.
    pub fn update(
        &self,
        profile_id: &str,
        request: &UpdateGatewayRequest,
        registry_view: &[GatewayProfile],
    ) -> Result<ConfigDocument> {
        let model = request.validate()?;
        let mut document = self.read(profile_id)?;

        if let Some(port) = request.port {
            ensure_port_free(port, Some(profile_id), registry_view)?;
            document.gateway.port = Some(port);
        }

        if request.touches_account() {
            let account =
                document.primary_account_mut(&self.channel_provider, DEFAULT_ACCOUNT_ID);
            if let Some(bot_name) = &request.bot_name {
                account.bot_name = Some(bot_name.clone());
            }
            if let Some(app_id) = &request.app_id {
                account.app_id = Some(app_id.clone());
            }
            if let Some(app_secret) = request.app_secret() {
                account.app_secret = Some(app_secret.to_string());
            }
        }

        let model_ref = model.map(|choice| match choice {
            ModelChoice::Preset(id) => id.to_string(),
            ModelChoice::Custom(custom) => document.apply_custom_model(custom),
        });

        if request.agent_id.is_some() || model_ref.is_some() {
            let agent = document.primary_agent_mut(profile_id);
            if let Some(agent_id) = &request.agent_id {
                agent.id = agent_id.clone();
            }
            if let Some(model_ref) = model_ref {
                agent.model = Some(ModelRef::Named(model_ref));
            }
        }

        write_document(&self.layout.config_path(profile_id)?, &document)?;

        if let Some(persona) = &request.persona {
            let agent_id = document
                .primary_agent()
                .map(|a| a.id.as_str())
                .filter(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_AGENT_ID);
            self.write_persona(profile_id, agent_id, persona)?;
        }

        info!("Updated gateway profile {}", profile_id);
        Ok(document)
    }

    /// Remove the profile directory tree. Anything at the profile path that
    /// cannot be removed as a directory is an `Io` error.
    pub fn remove(&self, profile_id: &str) -> Result<()> {
        let profile_dir = self.layout.profile_dir(profile_id)?;
        if !profile_dir.exists() {
            return Err(RegistryError::not_found(format!(
                "gateway profile '{profile_id}'"
            )));
        }
        std::fs::remove_dir_all(&profile_dir)?;
        info!("Removed gateway profile {}", profile_id);
        Ok(())
    }

    /// The global default config when present, else a minimal skeleton.
    fn base_template(&self, port: u16) -> Result<ConfigDocument> {
        if self.global_config_path.is_file() {
            debug!(
                "Using {} as profile template",
                self.global_config_path.display()
            );
            read_document(&self.global_config_path)
        } else {
            Ok(ConfigDocument::skeleton(port))
        }
    }
}

/// Fail when another installed profile already listens on `port`.
/// Placeholders and the profile being updated are ignored.
fn ensure_port_free(
    port: u16,
    exclude_id: Option<&str>,
    registry_view: &[GatewayProfile],
) -> Result<()> {
    let owner = registry_view
        .iter()
        .filter(|p| !p.placeholder && Some(p.id.as_str()) != exclude_id)
        .find(|p| p.port == port);

    match owner {
        Some(owner) => Err(RegistryError::PortConflict {
            port,
            owner: owner.id.clone(),
        }),
        None => Ok(()),
    }
}
