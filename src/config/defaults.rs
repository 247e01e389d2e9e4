//! Layout names, defaults and timeouts shared across the crate.

/// Default gateway port.
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;

/// Lowest port a new gateway may claim.
pub const MIN_GATEWAY_PORT: u16 = 1024;

/// Directory name prefix of a gateway profile under the profiles root.
pub const PROFILE_DIR_PREFIX: &str = ".openclaw-";

/// Directory holding the global (non-profile) OpenClaw configuration.
pub const GLOBAL_CONFIG_DIR: &str = ".openclaw";

/// File name of a profile's configuration document.
pub const CONFIG_FILE_NAME: &str = "openclaw.json";

/// Sub-directory of a profile holding per-agent documents.
pub const AGENT_CONFIGS_DIR: &str = "agent-configs";

/// File name of an agent's persona document.
pub const PERSONA_FILE_NAME: &str = "SOUL.md";

/// Supervisor label prefix; the profile id is appended.
pub const SUPERVISOR_LABEL_PREFIX: &str = "com.openclaw.";

/// Channel provider carrying the bot identity account.
pub const DEFAULT_CHANNEL_PROVIDER: &str = "feishu";

/// Account key written for a newly created bot identity.
pub const DEFAULT_ACCOUNT_ID: &str = "main";

/// Provider name of the custom model block.
pub const CUSTOM_PROVIDER_NAME: &str = "custom";

/// API flavour assumed for custom models when none is given.
pub const DEFAULT_CUSTOM_MODEL_API: &str = "openai-completions";

/// Agent id reported when a document lists no agents.
pub const UNKNOWN_AGENT_ID: &str = "unknown";

/// Registry cache time-to-live (seconds).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Pause between unload and load during a restart (milliseconds).
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// Timeout of a single listening-port check (milliseconds).
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 500;

/// Timeout of a supervisor command (seconds).
pub const SUPERVISOR_TIMEOUT_SECS: u64 = 30;

/// Timeout of a bulk procedure script (seconds).
pub const PROCEDURE_TIMEOUT_SECS: u64 = 300;

/// Persona written when none is supplied and returned when none exists.
pub const DEFAULT_PERSONA: &str = "# Agent Persona

## Role
You are a professional AI assistant.

## Personality
- Friendly and professional
- Eager to help
- Clear thinking

## Working Style
- Listen carefully to what the user needs
- Give accurate information
- Stay polite and patient
";
