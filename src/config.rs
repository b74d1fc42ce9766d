//! Engine configuration from the environment. A `.env` file is honored in
//! development; real deployments set variables directly.

use tracing::debug;

use crate::services::completion::{
    CompletionConfig, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL,
};

/// Everything the engine reads from the environment.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub completion: CompletionConfig,
    /// completions are optional; without them the engine stays fully
    /// deterministic
    pub use_completion: bool,
    /// overrides the editor's reply token budget when set
    pub max_output_tokens: Option<u32>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> Option<bool> {
    env_var(name).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl EngineConfig {
    /// Read configuration, loading `.env` first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_key = env_var("OPENAI_API_KEY").unwrap_or_default();
        let completion = CompletionConfig {
            api_key: api_key.clone(),
            base_url: env_var("OPENAI_BASE_URL")
                .or_else(|| env_var("OPENROUTER_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            model: env_var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
            max_attempts: env_var("OPENAI_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
            strict: env_flag("OPENAI_STRICT").unwrap_or(false),
        };
        let use_completion = env_flag("USE_OPENAI").unwrap_or(!api_key.is_empty());
        let max_output_tokens = env_var("OPENAI_MAX_OUTPUT_TOKENS").and_then(|v| v.parse().ok());

        debug!(
            target: "itinera::config",
            model = %completion.model,
            use_completion,
            strict = completion.strict,
            "configuration loaded"
        );
        Self {
            completion,
            use_completion,
            max_output_tokens,
        }
    }
}
