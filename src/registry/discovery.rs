//! Filesystem discovery of installed gateway profiles.

use crate::config::{read_document, ConfigDocument, DEFAULT_CHANNEL_PROVIDER, UNKNOWN_AGENT_ID};
use crate::error::Result;

use super::layout::ProfileLayout;
use super::types::GatewayProfile;
use tracing::{debug, info, warn};

/// Shown when no profile is installed: `(id, name, port, model)`.
const FALLBACK_PROFILES: [(&str, &str, u16, &str); 4] = [
    ("main-assistant", "Main Assistant", 18789, "anthropic/claude-opus-4-6"),
    ("content-creator", "Content Creator", 18790, "anthropic/claude-sonnet-4-5"),
    ("tech-dev", "Tech Dev", 18791, "anthropic/claude-sonnet-4-5-thinking"),
    ("ai-news", "AI News", 18792, "google/gemini-2.5-flash"),
];

/// Scans the profiles root for `.openclaw-<id>` directories.
#[derive(Debug, Clone)]
pub struct Discovery {
    layout: ProfileLayout,
    channel_provider: String,
}

impl Discovery {
    pub fn new(layout: ProfileLayout) -> Self {
        Self {
            layout,
            channel_provider: DEFAULT_CHANNEL_PROVIDER.to_string(),
        }
    }

    /// Channel provider whose first account names the gateway.
    pub fn with_channel_provider(mut self, provider: impl Into<String>) -> Self {
        self.channel_provider = provider.into();
        self
    }

    /// Read every profile that can be read, in directory-listing order.
    ///
    /// Unreadable profiles are skipped. Never returns an empty list: when
    /// nothing is installed the built-in placeholders are returned instead.
    pub fn scan(&self) -> Vec<GatewayProfile> {
        let mut profiles = Vec::new();

        match std::fs::read_dir(self.layout.root()) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let file_name = entry.file_name();
                    let Some(name) = file_name.to_str() else {
                        continue;
                    };
                    let Some(profile_id) = self.layout.profile_id_from_dir_name(name) else {
                        continue;
                    };
                    if !entry.path().is_dir() {
                        continue;
                    }

                    match self.load_profile(profile_id) {
                        Ok(profile) => profiles.push(profile),
                        Err(e) => warn!("Skipping gateway profile '{}': {}", profile_id, e),
                    }
                }
            }
            Err(e) => warn!(
                "Cannot list profiles root '{}': {}",
                self.layout.root().display(),
                e
            ),
        }

        if profiles.is_empty() {
            info!("No gateway profiles found, using built-in placeholders");
            return self.fallback_profiles();
        }

        debug!("Discovered {} gateway profile(s)", profiles.len());
        profiles
    }

    fn load_profile(&self, profile_id: &str) -> Result<GatewayProfile> {
        let config_path = self.layout.config_path(profile_id)?;
        let document = read_document(&config_path)?;
        Ok(profile_from_document(
            profile_id,
            config_path,
            &document,
            &self.channel_provider,
        ))
    }

    fn fallback_profiles(&self) -> Vec<GatewayProfile> {
        FALLBACK_PROFILES
            .iter()
            .map(|(id, name, port, model)| GatewayProfile {
                id: id.to_string(),
                name: name.to_string(),
                port: *port,
                agent_id: id.to_string(),
                model: Some(model.to_string()),
                config_path: self
                    .layout
                    .config_path(id)
                    .unwrap_or_default(),
                placeholder: true,
            })
            .collect()
    }
}

/// Summarize a configuration document.
pub(crate) fn profile_from_document(
    profile_id: &str,
    config_path: std::path::PathBuf,
    document: &ConfigDocument,
    channel_provider: &str,
) -> GatewayProfile {
    let agent = document.primary_agent();

    let agent_id = agent
        .map(|a| a.id.as_str())
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_AGENT_ID)
        .to_string();

    let model = agent
        .and_then(|a| a.model.as_ref())
        .and_then(|m| m.resolve())
        .map(String::from);

    let name = document
        .primary_account(channel_provider)
        .and_then(|(_, _, account)| account.bot_name.as_deref())
        .filter(|n| !n.is_empty())
        .unwrap_or(profile_id)
        .to_string();

    GatewayProfile {
        id: profile_id.to_string(),
        name,
        port: document.port(),
        agent_id,
        model,
        config_path,
        placeholder: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_profile(root: &Path, id: &str, doc: serde_json::Value) {
        let dir = root.join(format!(".openclaw-{id}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("openclaw.json"), doc.to_string()).unwrap();
    }

    #[test]
    fn extracts_summary_fields() {
        let root = TempDir::new().unwrap();
        write_profile(
            root.path(),
            "writer",
            json!({
                "gateway": {"port": 18795},
                "channels": {"feishu": {"accounts": {"main": {"botName": "Scribe"}}}},
                "agents": {"list": [{"id": "content", "model": {"primary": "openai/gpt-4o"}}]}
            }),
        );

        let profiles = Discovery::new(ProfileLayout::new(root.path())).scan();
        assert_eq!(profiles.len(), 1);
        let p = &profiles[0];
        assert_eq!(p.id, "writer");
        assert_eq!(p.name, "Scribe");
        assert_eq!(p.port, 18795);
        assert_eq!(p.agent_id, "content");
        assert_eq!(p.model.as_deref(), Some("openai/gpt-4o"));
        assert!(!p.placeholder);
    }

    #[test]
    fn sparse_document_uses_defaults() {
        let root = TempDir::new().unwrap();
        write_profile(root.path(), "bare", json!({}));

        let profiles = Discovery::new(ProfileLayout::new(root.path())).scan();
        let p = &profiles[0];
        assert_eq!(p.port, 18789);
        assert_eq!(p.agent_id, "unknown");
        assert_eq!(p.name, "bare");
        assert_eq!(p.model, None);
    }

    #[test]
    fn name_comes_from_configured_provider() {
        let root = TempDir::new().unwrap();
        write_profile(
            root.path(),
            "mixed",
            json!({"channels": {
                "telegram": {"accounts": {"default": {"botName": "Template Bot"}}},
                "slack": {"accounts": {"ops": {"botName": "Ops"}}}
            }}),
        );

        let discovery = Discovery::new(ProfileLayout::new(root.path()));
        assert_eq!(discovery.scan()[0].name, "Template Bot");

        let slack = discovery.with_channel_provider("slack");
        assert_eq!(slack.scan()[0].name, "Ops");
    }

    #[test]
    fn null_sections_do_not_hide_profile() {
        let root = TempDir::new().unwrap();
        write_profile(
            root.path(),
            "n",
            json!({"gateway": {"port": 18811}, "channels": null, "agents": null, "models": null}),
        );

        let profiles = Discovery::new(ProfileLayout::new(root.path())).scan();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, "n");
        assert_eq!(profiles[0].port, 18811);
        assert!(!profiles[0].placeholder);
    }

    #[test]
    fn skips_unreadable_profiles() {
        let root = TempDir::new().unwrap();
        write_profile(root.path(), "good", json!({"gateway": {"port": 18800}}));
        let broken = root.path().join(".openclaw-broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("openclaw.json"), "{ nope").unwrap();
        fs::create_dir_all(root.path().join(".openclaw-empty")).unwrap();
        fs::create_dir_all(root.path().join(".openclaw")).unwrap();

        let profiles = Discovery::new(ProfileLayout::new(root.path())).scan();
        let ids: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
    }

    #[test]
    fn empty_root_yields_placeholders() {
        let root = TempDir::new().unwrap();
        let profiles = Discovery::new(ProfileLayout::new(root.path())).scan();
        assert_eq!(profiles.len(), 4);
        assert!(profiles.iter().all(|p| p.placeholder));
        let ports: Vec<u16> = profiles.iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![18789, 18790, 18791, 18792]);
    }

    #[test]
    fn missing_root_yields_placeholders() {
        let root = TempDir::new().unwrap();
        let layout = ProfileLayout::new(root.path().join("does-not-exist"));
        assert_eq!(Discovery::new(layout).scan().len(), 4);
    }
}
