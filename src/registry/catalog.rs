use super::types::AgentInfo;

/// Agents offered when creating or editing a gateway.
pub const AGENTS: &[AgentInfo] = &[
    AgentInfo { id: "main", name: "Main Assistant" },
    AgentInfo { id: "content", name: "Content Creator" },
    AgentInfo { id: "coder", name: "Tech Dev" },
    AgentInfo { id: "news", name: "AI News" },
];

/// Preset model ids.
pub const MODELS: &[&str] = &[
    "anthropic/claude-opus-4-6",
    "anthropic/claude-sonnet-4-5",
    "anthropic/claude-sonnet-4-5-thinking",
    "anthropic/claude-haiku-4-5",
    "openai/gpt-4o",
    "openai/gpt-4o-mini",
    "google/gemini-2.5-pro",
    "google/gemini-2.5-flash",
    "deepseek/deepseek-chat",
];
