mod cache;
mod catalog;
mod discovery;
mod layout;
mod store;
mod types;

pub use cache::*;
pub use catalog::*;
pub use discovery::Discovery;
use discovery::profile_from_document;
pub use layout::*;
pub use store::*;
pub use types::*;

use crate::config::{validate_identifier, ConfigDocument, ManagerConfig, UNKNOWN_AGENT_ID};
use crate::error::{RegistryError, Result};
use crate::lifecycle::{
    FleetProcedure, LaunchdSupervisor, LifecycleController, ScriptRunner, TcpConnectProbe,
};

use futures::future::join_all;
use std::sync::Arc;
use tracing::info;

/// Entry point for callers: profile CRUD, lifecycle control and status.
///
/// Reads go through the cache; every create/update/delete invalidates it
/// whether or not the mutation succeeded.
pub struct GatewayRegistry {
    store: ConfigStore,
    cache: RegistryCache,
    lifecycle: LifecycleController,
}

impl GatewayRegistry {
    pub fn new(store: ConfigStore, cache: RegistryCache, lifecycle: LifecycleController) -> Self {
        Self {
            store,
            cache,
            lifecycle,
        }
    }

    /// Wire the registry to launchd, loopback port probes and the bulk scripts.
    pub fn from_config(config: &ManagerConfig) -> Self {
        let layout = ProfileLayout::new(&config.profiles_root);
        let store = ConfigStore::new(
            layout.clone(),
            config.global_config_path(),
            config.channel_provider.clone(),
        );
        let discovery = Discovery::new(layout).with_channel_provider(&config.channel_provider);
        let cache = RegistryCache::new(discovery, config.cache_ttl());
        let lifecycle = LifecycleController::new(
            Arc::new(LaunchdSupervisor::new(&config.launch_agents_dir)),
            Arc::new(TcpConnectProbe::new(config.probe_timeout())),
            Arc::new(ScriptRunner::new(&config.scripts_dir)),
            config.settle_delay(),
        );
        Self::new(store, cache, lifecycle)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Every known profile with its runtime status, probed concurrently.
    pub async fn list(&self) -> Vec<GatewayStatus> {
        let profiles = self.cache.get();
        join_all(profiles.into_iter().map(|profile| async move {
            let status = self.lifecycle.probe(&profile.id, profile.port).await;
            GatewayStatus { profile, status }
        }))
        .await
    }

    /// Drop the cache and list again.
    pub async fn rescan(&self) -> Vec<GatewayStatus> {
        self.cache.invalidate();
        let gateways = self.list().await;
        info!("Rescan found {} gateway(s)", gateways.len());
        gateways
    }

    pub fn get(&self, profile_id: &str) -> Result<ConfigDocument> {
        self.store.read(profile_id)
    }

    /// Persona of the profile's authoritative agent.
    pub fn persona(&self, profile_id: &str) -> Result<String> {
        let document = self.store.read(profile_id)?;
        let agent_id = document
            .primary_agent()
            .map(|a| a.id.as_str())
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_AGENT_ID);
        Ok(self.store.read_persona(profile_id, agent_id))
    }

    /// Persona of a specific agent; never fails.
    pub fn agent_persona(&self, profile_id: &str, agent_id: &str) -> String {
        self.store.read_persona(profile_id, agent_id)
    }

    pub fn agents(&self) -> &'static [AgentInfo] {
        AGENTS
    }

    pub fn models(&self) -> &'static [&'static str] {
        MODELS
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn create(&self, request: &CreateGatewayRequest) -> Result<GatewayProfile> {
        let view = self.cache.get();
        let result = self.store.create(request, &view);
        self.cache.invalidate();

        let document = result?;
        let config_path = self.store.layout().config_path(&request.profile_id)?;
        Ok(profile_from_document(
            &request.profile_id,
            config_path,
            &document,
            self.store.channel_provider(),
        ))
    }

    pub fn update(
        &self,
        profile_id: &str,
        request: &UpdateGatewayRequest,
    ) -> Result<GatewayProfile> {
        let view = self.cache.get();
        let result = self.store.update(profile_id, request, &view);
        self.cache.invalidate();

        let document = result?;
        let config_path = self.store.layout().config_path(profile_id)?;
        Ok(profile_from_document(
            profile_id,
            config_path,
            &document,
            self.store.channel_provider(),
        ))
    }

    /// Unload and remove the supervisor unit (failures ignored), then delete
    /// the profile directory (failures surfaced).
    pub async fn delete(&self, profile_id: &str) -> Result<()> {
        let result = self.delete_profile(profile_id).await;
        self.cache.invalidate();
        result
    }

    async fn delete_profile(&self, profile_id: &str) -> Result<()> {
        if !self.store.exists(profile_id)? {
            return Err(RegistryError::not_found(format!(
                "gateway profile '{profile_id}'"
            )));
        }
        self.lifecycle.decommission(profile_id).await;
        self.store.remove(profile_id)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub async fn start(&self, profile_id: &str) -> Result<()> {
        validate_identifier("profileId", profile_id)?;
        self.lifecycle.start(profile_id).await
    }

    pub async fn stop(&self, profile_id: &str) -> Result<()> {
        validate_identifier("profileId", profile_id)?;
        self.lifecycle.stop(profile_id).await
    }

    /// Takes at least the configured settle delay.
    pub async fn restart(&self, profile_id: &str) -> Result<()> {
        validate_identifier("profileId", profile_id)?;
        self.lifecycle.restart(profile_id).await
    }

    pub async fn start_all(&self) -> Result<String> {
        self.lifecycle.run_procedure(FleetProcedure::StartAll).await
    }

    pub async fn stop_all(&self) -> Result<String> {
        self.lifecycle.run_procedure(FleetProcedure::StopAll).await
    }

    pub async fn restart_all(&self) -> Result<String> {
        self.lifecycle.run_procedure(FleetProcedure::RestartAll).await
    }

    /// Install the supervisor keep-alive units.
    pub async fn setup_keep_alive(&self) -> Result<String> {
        self.lifecycle
            .run_procedure(FleetProcedure::InstallKeepAlive)
            .await
    }
}
