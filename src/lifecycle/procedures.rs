//! Fleet-wide procedures maintained outside this crate.
//!
//! Bulk start/stop/restart and the keep-alive installer are shell scripts
//! that are run to completion; their failure output is surfaced verbatim.

use crate::config::PROCEDURE_TIMEOUT_SECS;
use crate::error::{RegistryError, Result};

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FleetProcedure {
    StartAll,
    StopAll,
    RestartAll,
    InstallKeepAlive,
}

impl FleetProcedure {
    pub fn script_name(self) -> &'static str {
        match self {
            FleetProcedure::StartAll => "start-all-gateways.sh",
            FleetProcedure::StopAll => "stop-all-gateways.sh",
            FleetProcedure::RestartAll => "restart-launchd.sh",
            FleetProcedure::InstallKeepAlive => "setup-launchd.sh",
        }
    }
}

/// Invoke-and-wait runner for fleet procedures.
#[async_trait]
pub trait ProcedureRunner: Send + Sync {
    /// Run the procedure to completion, returning its standard output.
    async fn run(&self, procedure: FleetProcedure) -> Result<String>;
}

/// Runs procedures as `bash <scripts_dir>/<script>`.
pub struct ScriptRunner {
    scripts_dir: PathBuf,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            timeout: Duration::from_secs(PROCEDURE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ProcedureRunner for ScriptRunner {
    async fn run(&self, procedure: FleetProcedure) -> Result<String> {
        let script = self.scripts_dir.join(procedure.script_name());
        info!("Running {:?} via {}", procedure, script.display());

        let mut cmd = Command::new("bash");
        cmd.arg(&script);
        cmd.current_dir(&self.scripts_dir);
        cmd.stdin(std::process::Stdio::null());
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(RegistryError::ExternalTool(format!(
                    "{} exited with {}: {}",
                    procedure.script_name(),
                    output.status,
                    stderr.trim()
                )))
            }
            Ok(Err(e)) => Err(RegistryError::ExternalTool(format!(
                "failed to execute {}: {e}",
                procedure.script_name()
            ))),
            Err(_) => Err(RegistryError::ExternalTool(format!(
                "{} timed out after {}s",
                procedure.script_name(),
                self.timeout.as_secs()
            ))),
        }
    }
}
