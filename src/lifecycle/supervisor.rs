//! Process supervisor seam and its launchd implementation.
//!
//! Units are addressed by label (`com.openclaw.<profileId>`). The launchd
//! backend keeps one plist per label under the LaunchAgents directory and
//! drives it with `launchctl load|unload|list`.

use crate::config::{SUPERVISOR_LABEL_PREFIX, SUPERVISOR_TIMEOUT_SECS};
use crate::error::{RegistryError, Result};

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Supervisor label of a profile.
pub fn unit_label(profile_id: &str) -> String {
    format!("{SUPERVISOR_LABEL_PREFIX}{profile_id}")
}

/// The host facility that keeps gateway processes alive.
#[async_trait]
pub trait ProcessSupervisor: Send + Sync {
    /// Whether a unit definition exists for `label`.
    async fn has_unit(&self, label: &str) -> bool;

    /// Ask the supervisor to load (start) the unit.
    async fn load(&self, label: &str) -> Result<()>;

    /// Ask the supervisor to unload (stop) the unit.
    async fn unload(&self, label: &str) -> Result<()>;

    /// Labels of every unit the supervisor currently lists.
    async fn list(&self) -> Result<Vec<String>>;

    /// Delete the unit definition.
    async fn remove_unit(&self, label: &str) -> Result<()>;
}

/// macOS launchd via `launchctl`.
pub struct LaunchdSupervisor {
    agents_dir: PathBuf,
}

impl LaunchdSupervisor {
    pub fn new(agents_dir: impl Into<PathBuf>) -> Self {
        Self {
            agents_dir: agents_dir.into(),
        }
    }

    pub fn plist_path(&self, label: &str) -> PathBuf {
        self.agents_dir.join(format!("{label}.plist"))
    }

    async fn launchctl(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("launchctl");
        cmd.args(args);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let result =
            tokio::time::timeout(Duration::from_secs(SUPERVISOR_TIMEOUT_SECS), cmd.output()).await;

        match result {
            Ok(Ok(output)) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => Err(RegistryError::Lifecycle(format!(
                "launchctl {} exited with {}: {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Ok(Err(e)) => Err(RegistryError::Lifecycle(format!(
                "failed to execute launchctl: {e}"
            ))),
            Err(_) => Err(RegistryError::Lifecycle(format!(
                "launchctl {} timed out after {SUPERVISOR_TIMEOUT_SECS}s",
                args.join(" ")
            ))),
        }
    }

    async fn plist_arg(&self, label: &str) -> Result<String> {
        let plist = self.plist_path(label);
        if !self.has_unit(label).await {
            return Err(RegistryError::Lifecycle(format!(
                "unit file '{}' is missing",
                plist.display()
            )));
        }
        Ok(plist.to_string_lossy().into_owned())
    }
}

#[async_trait]
impl ProcessSupervisor for LaunchdSupervisor {
    async fn has_unit(&self, label: &str) -> bool {
        tokio::fs::try_exists(self.plist_path(label))
            .await
            .unwrap_or(false)
    }

    async fn load(&self, label: &str) -> Result<()> {
        let plist = self.plist_arg(label).await?;
        self.launchctl(&["load", &plist]).await?;
        debug!("launchd loaded {}", label);
        Ok(())
    }

    async fn unload(&self, label: &str) -> Result<()> {
        let plist = self.plist_arg(label).await?;
        self.launchctl(&["unload", &plist]).await?;
        debug!("launchd unloaded {}", label);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let stdout = self.launchctl(&["list"]).await?;
        Ok(parse_launchctl_list(&stdout))
    }

    async fn remove_unit(&self, label: &str) -> Result<()> {
        remove_if_present(&self.plist_path(label)).await
    }
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Extract labels from `launchctl list` output (`PID\tStatus\tLabel` rows).
fn parse_launchctl_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|line| line.starts_with("PID"))
        .filter_map(|line| line.split_whitespace().nth(2))
        .map(String::from)
        .collect()
}
