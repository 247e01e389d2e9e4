mod probe;
mod procedures;
mod supervisor;

pub use probe::*;
pub use procedures::*;
pub use supervisor::*;

use crate::error::{RegistryError, Result};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// Runtime Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Running,
    Stopped,
    /// A check failed, or the port and supervisor disagree.
    Unknown,
}

/// Point-in-time status of one profile; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub port_open: bool,
    pub supervised: bool,
    pub state: LifecycleState,
}

impl RuntimeStatus {
    fn from_checks(port_open: Option<bool>, supervised: Option<bool>) -> Self {
        let state = match (port_open, supervised) {
            (Some(true), Some(true)) => LifecycleState::Running,
            (Some(false), Some(false)) => LifecycleState::Stopped,
            _ => LifecycleState::Unknown,
        };
        Self {
            port_open: port_open.unwrap_or(false),
            supervised: supervised.unwrap_or(false),
            state,
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Drives the process supervisor on behalf of individual profiles.
pub struct LifecycleController {
    supervisor: Arc<dyn ProcessSupervisor>,
    ports: Arc<dyn PortProbe>,
    procedures: Arc<dyn ProcedureRunner>,
    settle_delay: Duration,
}

impl LifecycleController {
    pub fn new(
        supervisor: Arc<dyn ProcessSupervisor>,
        ports: Arc<dyn PortProbe>,
        procedures: Arc<dyn ProcedureRunner>,
        settle_delay: Duration,
    ) -> Self {
        Self {
            supervisor,
            ports,
            procedures,
            settle_delay,
        }
    }

    pub async fn start(&self, profile_id: &str) -> Result<()> {
        let label = unit_label(profile_id);
        if !self.supervisor.has_unit(&label).await {
            return Err(RegistryError::Lifecycle(format!(
                "no supervisor unit '{label}' is installed for {profile_id}"
            )));
        }
        self.supervisor.load(&label).await?;
        info!("Started gateway {}", profile_id);
        Ok(())
    }

    pub async fn stop(&self, profile_id: &str) -> Result<()> {
        let label = unit_label(profile_id);
        self.supervisor.unload(&label).await?;
        info!("Stopped gateway {}", profile_id);
        Ok(())
    }

    /// Unload, wait the settle delay, then load again.
    ///
    /// The wait happens inline, so a successful restart never returns sooner
    /// than the settle delay. If the unload fails the error is returned at
    /// once, without waiting and without attempting the load.
    pub async fn restart(&self, profile_id: &str) -> Result<()> {
        let label = unit_label(profile_id);
        self.supervisor.unload(&label).await?;
        tokio::time::sleep(self.settle_delay).await;
        self.supervisor.load(&label).await?;
        info!("Restarted gateway {}", profile_id);
        Ok(())
    }

    /// Best-effort unload and unit removal ahead of deleting a profile.
    pub async fn decommission(&self, profile_id: &str) {
        let label = unit_label(profile_id);
        if let Err(e) = self.supervisor.unload(&label).await {
            warn!("Ignoring unload failure for {}: {}", profile_id, e);
        }
        if let Err(e) = self.supervisor.remove_unit(&label).await {
            warn!("Ignoring unit removal failure for {}: {}", profile_id, e);
        }
    }

    /// Check the listening port and the supervisor listing independently.
    pub async fn probe(&self, profile_id: &str, port: u16) -> RuntimeStatus {
        let label = unit_label(profile_id);
        let (port_check, unit_check) =
            tokio::join!(self.ports.is_listening(port), self.supervisor.list());

        let port_open = match port_check {
            Ok(open) => Some(open),
            Err(e) => {
                debug!("Port probe {} for {} failed: {}", port, profile_id, e);
                None
            }
        };
        let supervised = match unit_check {
            Ok(labels) => Some(labels.iter().any(|l| *l == label)),
            Err(e) => {
                debug!("Supervisor listing for {} failed: {}", profile_id, e);
                None
            }
        };

        let status = RuntimeStatus::from_checks(port_open, supervised);
        debug!("Probe {}: {:?}", profile_id, status);
        status
    }

    /// Run a fleet-wide procedure and wait for it.
    pub async fn run_procedure(&self, procedure: FleetProcedure) -> Result<String> {
        let output = self.procedures.run(procedure).await?;
        info!("Fleet procedure {:?} completed", procedure);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_agreement_and_ambiguity() {
        assert_eq!(
            RuntimeStatus::from_checks(Some(true), Some(true)).state,
            LifecycleState::Running
        );
        assert_eq!(
            RuntimeStatus::from_checks(Some(false), Some(false)).state,
            LifecycleState::Stopped
        );

        let port_only = RuntimeStatus::from_checks(Some(true), Some(false));
        assert_eq!(port_only.state, LifecycleState::Unknown);
        assert!(port_only.port_open);
        assert!(!port_only.supervised);
    }

    #[test]
    fn failed_check_reports_false_and_unknown() {
        let status = RuntimeStatus::from_checks(None, Some(true));
        assert_eq!(status.state, LifecycleState::Unknown);
        assert!(!status.port_open);
        assert!(status.supervised);
    }

    #[test]
    fn status_serializes_camel_case() {
        let status = RuntimeStatus::from_checks(Some(true), Some(true));
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"portOpen": true, "supervised": true, "state": "running"})
        );
    }
}
