mod defaults;
mod document;
mod io;
mod validation;

pub use defaults::*;
pub use document::*;
pub use io::*;
pub use validation::*;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Settings of the fleet manager itself (not of any gateway).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManagerConfig {
    /// Directory holding the `.openclaw-<id>` profile directories.
    pub profiles_root: PathBuf,
    /// Template for new profiles; defaults to `<profilesRoot>/.openclaw/openclaw.json`.
    pub global_config_path: Option<PathBuf>,
    /// Directory holding launchd unit files.
    pub launch_agents_dir: PathBuf,
    /// Directory holding the bulk start/stop/restart and keep-alive scripts.
    pub scripts_dir: PathBuf,
    pub cache_ttl_secs: u64,
    pub settle_delay_ms: u64,
    pub probe_timeout_ms: u64,
    /// Channel provider whose first account is the bot identity.
    pub channel_provider: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let home = home_dir();
        Self {
            launch_agents_dir: home.join("Library").join("LaunchAgents"),
            scripts_dir: PathBuf::from("."),
            profiles_root: home,
            global_config_path: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            channel_provider: DEFAULT_CHANNEL_PROVIDER.to_string(),
        }
    }
}

impl ManagerConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(PathBuf::from).or_else(find_config_file);

        let mut config = match config_path {
            Some(ref p) if p.exists() => {
                info!("Loading manager config from {}", p.display());
                load_config_file(p)?
            }
            _ => {
                info!("No manager config file found, using defaults");
                ManagerConfig::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Write default configuration to a file.
    pub fn write_default(path: &str) -> Result<()> {
        let config = ManagerConfig::default();
        let json = serde_json::to_string_pretty(&config)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Template document used as the base of new profiles.
    pub fn global_config_path(&self) -> PathBuf {
        self.global_config_path.clone().unwrap_or_else(|| {
            self.profiles_root
                .join(GLOBAL_CONFIG_DIR)
                .join(CONFIG_FILE_NAME)
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var("CLAWFLEET_PROFILES_ROOT") {
            self.profiles_root = PathBuf::from(root);
        }

        if let Ok(dir) = std::env::var("CLAWFLEET_SCRIPTS_DIR") {
            self.scripts_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("CLAWFLEET_LAUNCH_AGENTS_DIR") {
            self.launch_agents_dir = PathBuf::from(dir);
        }

        if let Ok(ttl) = std::env::var("CLAWFLEET_CACHE_TTL_SECS") {
            if let Ok(ttl) = ttl.parse() {
                self.cache_ttl_secs = ttl;
            }
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Find the manager configuration file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        PathBuf::from("clawfleet.json"),
        PathBuf::from("clawfleet.yaml"),
        PathBuf::from("clawfleet.yml"),
        PathBuf::from("clawfleet.toml"),
    ];

    for path in &candidates {
        if path.exists() {
            return Some(path.clone());
        }
    }

    let home_config = home_dir().join(".clawfleet").join("config.json");
    if home_config.exists() {
        return Some(home_config);
    }

    None
}

/// Load configuration from a file path.
fn load_config_file(path: &Path) -> Result<ManagerConfig> {
    let value = read_settings_value(path)
        .with_context(|| format!("Failed to read manager config '{}'", path.display()))?;
    let config = serde_json::from_value(value)
        .with_context(|| format!("Invalid manager config '{}'", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clawfleet.toml");
        std::fs::write(&file, "profilesRoot = \"/srv/gateways\"\nsettleDelayMs = 250\n").unwrap();

        let config = load_config_file(&file).unwrap();
        assert_eq!(config.profiles_root, PathBuf::from("/srv/gateways"));
        assert_eq!(config.settle_delay(), Duration::from_millis(250));
        assert_eq!(config.cache_ttl(), Duration::from_secs(DEFAULT_CACHE_TTL_SECS));
        assert_eq!(config.channel_provider, DEFAULT_CHANNEL_PROVIDER);
        assert_eq!(
            config.global_config_path(),
            PathBuf::from("/srv/gateways/.openclaw/openclaw.json")
        );
    }
}
