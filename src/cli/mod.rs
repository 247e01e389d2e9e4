use crate::config::CustomModelSpec;
use crate::registry::{CreateGatewayRequest, UpdateGatewayRequest};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "clawfleet", version, about = "Manage a fleet of local OpenClaw gateways")]
pub struct Cli {
    /// Manager configuration file.
    #[arg(short, long, global = true, env = "CLAWFLEET_CONFIG")]
    pub config: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List gateways with their runtime status.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Rescan profile directories, bypassing the cache.
    Rescan,
    /// Print a gateway's configuration document.
    Show { id: String },
    /// Print a gateway's persona document.
    Persona {
        id: String,
        /// Agent whose persona to print (defaults to the gateway's agent).
        #[arg(short, long)]
        agent: Option<String>,
    },
    Create(CreateOpts),
    Update(UpdateOpts),
    Delete { id: String },
    Start { id: String },
    Stop { id: String },
    Restart { id: String },
    StartAll,
    StopAll,
    RestartAll,
    /// Install supervisor keep-alive units for every gateway.
    SetupKeepalive,
    /// List available agent identifiers.
    Agents,
    /// List preset model identifiers.
    Models,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    Show,
    Init,
}

#[derive(Args, Default)]
pub struct CustomModelOpts {
    /// Custom model id served by an OpenAI-compatible endpoint.
    #[arg(long)]
    pub custom_model: Option<String>,
    #[arg(long, requires = "custom_model")]
    pub custom_base_url: Option<String>,
    #[arg(long, requires = "custom_model")]
    pub custom_api_key: Option<String>,
    #[arg(long, requires = "custom_model")]
    pub custom_api: Option<String>,
}

impl CustomModelOpts {
    fn into_spec(self) -> Option<CustomModelSpec> {
        self.custom_model.map(|id| CustomModelSpec {
            id,
            base_url: self.custom_base_url.unwrap_or_default(),
            api_key: self.custom_api_key.unwrap_or_default(),
            api: self.custom_api,
        })
    }
}

#[derive(Args)]
pub struct CreateOpts {
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long, default_value_t = crate::config::DEFAULT_GATEWAY_PORT)]
    pub port: u16,
    #[arg(long)]
    pub agent: String,
    #[arg(long)]
    pub model: Option<String>,
    #[command(flatten)]
    pub custom: CustomModelOpts,
    #[arg(long, env = "CLAWFLEET_APP_ID")]
    pub app_id: String,
    #[arg(long, env = "CLAWFLEET_APP_SECRET", hide_env_values = true)]
    pub app_secret: String,
    /// Markdown file with the agent persona.
    #[arg(long)]
    pub persona_file: Option<PathBuf>,
}

impl CreateOpts {
    pub fn into_request(self) -> Result<CreateGatewayRequest> {
        Ok(CreateGatewayRequest {
            profile_id: self.id,
            bot_name: self.name,
            port: self.port,
            agent_id: self.agent,
            model_id: self.model,
            custom_model: self.custom.into_spec(),
            app_id: self.app_id,
            app_secret: self.app_secret,
            persona: read_persona_file(self.persona_file.as_ref())?,
        })
    }
}

#[derive(Args)]
pub struct UpdateOpts {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub agent: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[command(flatten)]
    pub custom: CustomModelOpts,
    #[arg(long)]
    pub app_id: Option<String>,
    #[arg(long)]
    pub app_secret: Option<String>,
    /// Replace the persona with this file's content.
    #[arg(long, conflicts_with = "clear_persona")]
    pub persona_file: Option<PathBuf>,
    /// Overwrite the persona with empty content.
    #[arg(long)]
    pub clear_persona: bool,
}

impl UpdateOpts {
    pub fn into_request(self) -> Result<(String, UpdateGatewayRequest)> {
        let persona = if self.clear_persona {
            Some(String::new())
        } else {
            read_persona_file(self.persona_file.as_ref())?
        };

        let request = UpdateGatewayRequest {
            bot_name: self.name,
            port: self.port,
            agent_id: self.agent,
            model_id: self.model,
            custom_model: self.custom.into_spec(),
            app_id: self.app_id,
            app_secret: self.app_secret,
            persona,
        };
        Ok((self.id, request))
    }
}

fn read_persona_file(path: Option<&PathBuf>) -> Result<Option<String>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.is_file() {
        bail!("Persona file '{}' does not exist", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read persona file '{}'", path.display()))?;
    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_persona_sends_empty_string() {
        let cli = Cli::try_parse_from(["clawfleet", "update", "helper", "--clear-persona"]).unwrap();
        let Commands::Update(opts) = cli.command else {
            panic!("expected update");
        };
        let (id, request) = opts.into_request().unwrap();
        assert_eq!(id, "helper");
        assert_eq!(request.persona.as_deref(), Some(""));
        assert_eq!(request.port, None);
    }

    #[test]
    fn update_without_persona_flags_leaves_persona_absent() {
        let cli =
            Cli::try_parse_from(["clawfleet", "update", "helper", "--port", "18801"]).unwrap();
        let Commands::Update(opts) = cli.command else {
            panic!("expected update");
        };
        let (_, request) = opts.into_request().unwrap();
        assert_eq!(request.persona, None);
        assert_eq!(request.port, Some(18801));
    }

    #[test]
    fn create_collects_custom_model() {
        let cli = Cli::try_parse_from([
            "clawfleet",
            "create",
            "helper",
            "--name",
            "Helper",
            "--agent",
            "main",
            "--custom-model",
            "qwen-max",
            "--custom-base-url",
            "https://example.com/v1",
            "--custom-api-key",
            "sk",
            "--app-id",
            "cli_a",
            "--app-secret",
            "s",
        ])
        .unwrap();
        let Commands::Create(opts) = cli.command else {
            panic!("expected create");
        };
        let request = opts.into_request().unwrap();
        assert_eq!(request.port, 18789);
        let custom = request.custom_model.unwrap();
        assert_eq!(custom.id, "qwen-max");
        assert_eq!(custom.base_url, "https://example.com/v1");
    }
}
