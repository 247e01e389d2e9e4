use crate::config::{
    validate_identifier, AGENT_CONFIGS_DIR, CONFIG_FILE_NAME, PERSONA_FILE_NAME, PROFILE_DIR_PREFIX,
};
use crate::error::Result;

use std::path::{Path, PathBuf};

/// Filesystem naming convention of installed gateway profiles:
/// `<root>/.openclaw-<id>/openclaw.json` plus
/// `<root>/.openclaw-<id>/agent-configs/<agentId>/SOUL.md`.
#[derive(Debug, Clone)]
pub struct ProfileLayout {
    root: PathBuf,
}

impl ProfileLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Profile id encoded in a directory name, if it follows the convention.
    pub fn profile_id_from_dir_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(PROFILE_DIR_PREFIX)
            .filter(|id| !id.is_empty())
    }

    /// Profile directory; the id is validated since it becomes a path component.
    pub fn profile_dir(&self, profile_id: &str) -> Result<PathBuf> {
        validate_identifier("profileId", profile_id)?;
        Ok(self.root.join(format!("{PROFILE_DIR_PREFIX}{profile_id}")))
    }

    pub fn config_path(&self, profile_id: &str) -> Result<PathBuf> {
        Ok(self.profile_dir(profile_id)?.join(CONFIG_FILE_NAME))
    }

    pub fn persona_path(&self, profile_id: &str, agent_id: &str) -> Result<PathBuf> {
        validate_identifier("agentId", agent_id)?;
        Ok(self
            .profile_dir(profile_id)?
            .join(AGENT_CONFIGS_DIR)
            .join(agent_id)
            .join(PERSONA_FILE_NAME))
    }
}
