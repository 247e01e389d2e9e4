//! Typed view over a gateway profile's `openclaw.json`.
//!
//! Only the sections the registry reads or writes are modelled. Every level
//! carries a flattened `extra` map so keys this crate does not know about
//! survive a read-modify-write cycle untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::defaults::{CUSTOM_PROVIDER_NAME, DEFAULT_CUSTOM_MODEL_API, DEFAULT_GATEWAY_PORT};

// ============================================================================
// Document Root
// ============================================================================

/// The persisted configuration document of one gateway profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub gateway: GatewaySection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: IndexMap<String, ChannelSection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: AgentsSection,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: ModelsSection,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigDocument {
    /// The minimal document used when no global template exists.
    pub fn skeleton(port: u16) -> Self {
        let mut gateway = GatewaySection {
            port: Some(port),
            ..Default::default()
        };
        gateway
            .extra
            .insert("mode".to_string(), Value::String("local".to_string()));
        Self {
            gateway,
            ..Default::default()
        }
    }

    /// Listening port, falling back to the gateway default.
    pub fn port(&self) -> u16 {
        self.gateway.port.unwrap_or(DEFAULT_GATEWAY_PORT)
    }

    /// The authoritative agent entry (first of `agents.list`).
    pub fn primary_agent(&self) -> Option<&AgentEntry> {
        self.agents.list.first()
    }

    /// The authoritative agent entry, inserting one named `default_id` when
    /// the list is empty.
    pub fn primary_agent_mut(&mut self, default_id: &str) -> &mut AgentEntry {
        if self.agents.list.is_empty() {
            self.agents.list.push(AgentEntry {
                id: default_id.to_string(),
                ..Default::default()
            });
        }
        &mut self.agents.list[0]
    }

    /// The bot identity: the first account of `provider`, or, when that
    /// channel has none, the first account of the first channel that has one.
    pub fn primary_account(&self, provider: &str) -> Option<(&str, &str, &AccountEntry)> {
        self.channels
            .get_key_value(provider)
            .and_then(first_account)
            .or_else(|| self.channels.iter().find_map(first_account))
    }

    /// The bot identity account for editing. When no channel has an account
    /// yet, one is created under `provider` / `default_account_id`.
    pub fn primary_account_mut(
        &mut self,
        provider: &str,
        default_account_id: &str,
    ) -> &mut AccountEntry {
        let provider = self
            .primary_account(provider)
            .map(|(name, _, _)| name.to_string())
            .unwrap_or_else(|| provider.to_string());
        let channel = self.channels.entry(provider).or_default();
        let account_id = channel
            .accounts
            .keys()
            .next()
            .cloned()
            .unwrap_or_else(|| default_account_id.to_string());
        channel.accounts.entry(account_id).or_default()
    }

    /// Replace the provider's accounts with a single bot identity entry.
    pub fn set_single_account(&mut self, provider: &str, account_id: &str, account: AccountEntry) {
        let channel = self.channels.entry(provider.to_string()).or_default();
        channel.enabled.get_or_insert(true);
        channel.accounts.clear();
        channel.accounts.insert(account_id.to_string(), account);
    }

    /// Install (or replace) the custom model provider block and return the
    /// model reference agents should use for it.
    pub fn apply_custom_model(&mut self, custom: &CustomModelSpec) -> String {
        let provider = ProviderEntry {
            base_url: Some(custom.base_url.clone()),
            api_key: Some(custom.api_key.clone()),
            auth: Some("api-key".to_string()),
            api: Some(
                custom
                    .api
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CUSTOM_MODEL_API.to_string()),
            ),
            models: vec![ProviderModel {
                id: custom.id.clone(),
                name: Some(custom.id.clone()),
                extra: Map::new(),
            }],
            extra: Map::new(),
        };
        self.models
            .providers
            .insert(CUSTOM_PROVIDER_NAME.to_string(), provider);
        format!("{CUSTOM_PROVIDER_NAME}/{}", custom.id)
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accounts: IndexMap<String, AccountEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One chat-platform account; the first one is the bot identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentsSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub list: Vec<AgentEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An agent's model, either a plain id or the structured `{primary, id}` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelRef {
    Named(String),
    Resolved {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        primary: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl ModelRef {
    /// The effective model id: the string itself, or the first non-empty of
    /// `primary` / `id`.
    pub fn resolve(&self) -> Option<&str> {
        match self {
            ModelRef::Named(name) => Some(name.as_str()).filter(|s| !s.is_empty()),
            ModelRef::Resolved { primary, id, .. } => primary
                .as_deref()
                .filter(|s| !s.is_empty())
                .or_else(|| id.as_deref().filter(|s| !s.is_empty())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelsSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: IndexMap<String, ProviderEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<ProviderModel>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProviderModel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn first_account<'a>(
    (provider, channel): (&'a String, &'a ChannelSection),
) -> Option<(&'a str, &'a str, &'a AccountEntry)> {
    channel
        .accounts
        .first()
        .map(|(id, account)| (provider.as_str(), id.as_str(), account))
}

/// An explicit `null` reads the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A model served by a user-supplied OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomModelSpec {
    pub id: String,
    pub base_url: String,
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_ref_accepts_both_shapes() {
        let named: ModelRef = serde_json::from_value(json!("anthropic/claude-opus-4-6")).unwrap();
        assert_eq!(named.resolve(), Some("anthropic/claude-opus-4-6"));

        let structured: ModelRef =
            serde_json::from_value(json!({"primary": "", "id": "gpt-4o", "fallbacks": []}))
                .unwrap();
        assert_eq!(structured.resolve(), Some("gpt-4o"));

        let primary_wins: ModelRef =
            serde_json::from_value(json!({"primary": "a", "id": "b"})).unwrap();
        assert_eq!(primary_wins.resolve(), Some("a"));
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let raw = json!({
            "gateway": {"port": 18790, "mode": "local", "auth": {"token": "t"}},
            "channels": {"feishu": {"accounts": {"main": {"appId": "cli_1", "domain": "feishu"}}}},
            "agents": {"defaults": {"workspace": "~/w"}, "list": [{"id": "main", "workspace": "~/x"}]},
            "models": {"mode": "merge", "providers": {}},
            "plugins": {"entries": {}}
        });
        let doc: ConfigDocument = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.port(), 18790);
        assert_eq!(serde_json::to_value(&doc).unwrap(), raw);
    }

    #[test]
    fn first_account_key_is_identity() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "channels": {"feishu": {"accounts": {
                "zeta": {"botName": "First"},
                "alpha": {"botName": "Second"}
            }}}
        }))
        .unwrap();
        let (provider, account_id, account) = doc.primary_account("feishu").unwrap();
        assert_eq!(provider, "feishu");
        assert_eq!(account_id, "zeta");
        assert_eq!(account.bot_name.as_deref(), Some("First"));
    }

    #[test]
    fn missing_sections_default_and_port_falls_back() {
        let doc: ConfigDocument = serde_json::from_value(json!({})).unwrap();
        assert_eq!(doc.port(), DEFAULT_GATEWAY_PORT);
        assert!(doc.primary_agent().is_none());
        assert!(doc.primary_account("feishu").is_none());
    }

    #[test]
    fn configured_provider_wins_over_earlier_channels() {
        let mut doc: ConfigDocument = serde_json::from_value(json!({
            "channels": {
                "telegram": {"accounts": {"default": {"botName": "Template Bot"}}},
                "feishu": {"accounts": {"main": {"botName": "Helper"}}}
            }
        }))
        .unwrap();

        let (provider, account_id, account) = doc.primary_account("feishu").unwrap();
        assert_eq!((provider, account_id), ("feishu", "main"));
        assert_eq!(account.bot_name.as_deref(), Some("Helper"));

        doc.primary_account_mut("feishu", "main").bot_name = Some("Renamed".into());
        assert_eq!(
            doc.channels["feishu"].accounts["main"].bot_name.as_deref(),
            Some("Renamed")
        );
        assert_eq!(
            doc.channels["telegram"].accounts["default"].bot_name.as_deref(),
            Some("Template Bot")
        );
    }

    #[test]
    fn other_channel_is_identity_when_provider_has_no_accounts() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "channels": {"telegram": {"accounts": {"bot": {"botName": "Tg"}}}}
        }))
        .unwrap();
        let (provider, account_id, _) = doc.primary_account("feishu").unwrap();
        assert_eq!((provider, account_id), ("telegram", "bot"));
    }

    #[test]
    fn null_sections_read_as_absent() {
        let doc: ConfigDocument = serde_json::from_value(json!({
            "gateway": null,
            "channels": {"feishu": {"accounts": null}},
            "agents": {"list": null},
            "models": null
        }))
        .unwrap();
        assert_eq!(doc.port(), DEFAULT_GATEWAY_PORT);
        assert!(doc.primary_agent().is_none());
        assert!(doc.channels["feishu"].accounts.is_empty());
        assert!(doc.models.providers.is_empty());
    }

    #[test]
    fn custom_model_block_replaces_previous() {
        let mut doc = ConfigDocument::skeleton(18789);
        let first = CustomModelSpec {
            id: "qwen-max".into(),
            base_url: "https://a.example/v1".into(),
            api_key: "k1".into(),
            api: None,
        };
        assert_eq!(doc.apply_custom_model(&first), "custom/qwen-max");

        let second = CustomModelSpec {
            id: "deepseek-chat".into(),
            base_url: "https://b.example/v1".into(),
            api_key: "k2".into(),
            api: Some("openai-responses".into()),
        };
        assert_eq!(doc.apply_custom_model(&second), "custom/deepseek-chat");

        let provider = &doc.models.providers["custom"];
        assert_eq!(provider.base_url.as_deref(), Some("https://b.example/v1"));
        assert_eq!(provider.api.as_deref(), Some("openai-responses"));
        assert_eq!(provider.models.len(), 1);
        assert_eq!(provider.models[0].id, "deepseek-chat");
    }
}
