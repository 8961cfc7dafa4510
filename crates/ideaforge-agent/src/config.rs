//! Backend selection and construction.
//!
//! Settings come from environment variables. Resolution takes a lookup
//! closure so tests can feed a map instead of the process environment.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ideaforge_models::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::anthropic::{self, AnthropicClient};
use crate::client::{http_client, LlmClient, DEFAULT_TIMEOUT};
use crate::error::Result;
use crate::openai::{self, OpenAiClient};

/// Wire protocol spoken by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Anthropic Messages API.
    Anthropic,
    /// OpenAI-compatible chat completions.
    OpenAI,
}

impl Provider {
    /// Lowercase name as used in `LLM_BACKEND`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAI => "openai",
        }
    }

    /// Endpoint used when `LLM_BASE_URL` is unset.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_API_URL,
            Self::OpenAI => openai::DEFAULT_BASE_URL,
        }
    }

    /// Model used when `LLM_MODEL` is unset.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => anthropic::DEFAULT_MODEL,
            Self::OpenAI => openai::DEFAULT_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "openai-compatible" => Ok(Self::OpenAI),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Resolved backend settings.
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub provider: Provider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Caller identity some proxies require.
    pub user: Option<String>,
    pub timeout: Duration,
    pub skip_tls_verify: bool,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("user", &self.user)
            .field("timeout", &self.timeout)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish()
    }
}

impl BackendConfig {
    /// Settings for `provider` with its default endpoint and model.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
            user: None,
            timeout: DEFAULT_TIMEOUT,
            skip_tls_verify: false,
        }
    }

    /// Resolve from the process environment.
    ///
    /// `api_key_override` is a key supplied by the caller (for example a
    /// command-line flag); `LLM_API_KEY` still takes precedence over it.
    pub fn from_env(api_key_override: Option<&str>) -> std::result::Result<Self, ConfigError> {
        Self::resolve_with(|name| std::env::var(name).ok(), api_key_override)
    }

    /// Resolve using `lookup` to read variables.
    ///
    /// Backend priority: `LLM_BACKEND`, then a caller-supplied key
    /// (anthropic), then Anthropic keys, then OpenAI or proxy keys.
    pub fn resolve_with<F>(
        lookup: F,
        api_key_override: Option<&str>,
    ) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key_override = api_key_override.filter(|k| !k.trim().is_empty());

        let provider = match get("LLM_BACKEND") {
            Some(name) => name.parse()?,
            None if api_key_override.is_some() => Provider::Anthropic,
            None if get("ANTHROPIC_API_KEY").is_some() || get("ANTHROPIC_KEY").is_some() => {
                Provider::Anthropic
            }
            None if get("LLMPROXY_KEY").is_some()
                || get("OPENAI_API_KEY").is_some()
                || get("LLM_API_KEY").is_some() =>
            {
                Provider::OpenAI
            }
            None => {
                return Err(ConfigError::MissingApiKey(
                    "set ANTHROPIC_API_KEY, LLMPROXY_KEY, OPENAI_API_KEY or LLM_API_KEY".into(),
                ))
            }
        };

        let mut user = None;
        let api_key = get("LLM_API_KEY")
            .or_else(|| api_key_override.map(str::to_string))
            .or_else(|| match provider {
                Provider::Anthropic => get("ANTHROPIC_API_KEY").or_else(|| get("ANTHROPIC_KEY")),
                Provider::OpenAI => get("OPENAI_API_KEY").or_else(|| {
                    let raw = get("LLMPROXY_KEY")?;
                    let (key, proxy_user) = parse_proxy_key(&raw);
                    user = proxy_user;
                    Some(key)
                }),
            })
            .ok_or_else(|| {
                ConfigError::MissingApiKey(format!("no key for backend {}", provider))
            })?;

        let timeout = get("LLM_TIMEOUT")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        let skip_tls_verify = get("LLM_SKIP_TLS_VERIFY")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let config = Self {
            provider,
            api_key,
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| provider.default_base_url().into()),
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().into()),
            user,
            timeout,
            skip_tls_verify,
        };

        debug!(
            provider = %config.provider,
            model = %config.model,
            base_url = %config.base_url,
            "Resolved backend configuration"
        );

        Ok(config)
    }
}

/// Split a proxy credential of the form `user=<u>&key=<k>`.
///
/// A value without a `key=` part is used whole as the key.
fn parse_proxy_key(raw: &str) -> (String, Option<String>) {
    let mut key = None;
    let mut user = None;
    for part in raw.split('&') {
        if let Some(k) = part.strip_prefix("key=") {
            key.get_or_insert_with(|| k.to_string());
        } else if let Some(u) = part.strip_prefix("user=") {
            user.get_or_insert_with(|| u.to_string());
        }
    }
    (key.unwrap_or_else(|| raw.to_string()), user)
}

/// Build the client described by `config`.
pub fn create_client(config: &BackendConfig) -> Result<Arc<dyn LlmClient>> {
    let http = http_client(config.timeout, config.skip_tls_verify)?;

    info!(provider = %config.provider, model = %config.model, "Creating backend client");

    let client: Arc<dyn LlmClient> = match config.provider {
        Provider::Anthropic => Arc::new(
            AnthropicClient::new(config.api_key.clone())?
                .with_http_client(http)
                .with_model(config.model.clone())
                .with_base_url(config.base_url.clone()),
        ),
        Provider::OpenAI => {
            let mut client = OpenAiClient::new(config.api_key.clone())?
                .with_http_client(http)
                .with_model(config.model.clone())
                .with_base_url(config.base_url.clone());
            if let Some(user) = &config.user {
                client = client.with_user(user.clone());
            }
            Arc::new(client)
        }
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(
        vars: &[(&str, &str)],
        override_key: Option<&str>,
    ) -> std::result::Result<BackendConfig, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BackendConfig::resolve_with(|name| env.get(name).cloned(), override_key)
    }

    #[test]
    fn test_anthropic_key_selects_anthropic() {
        let config = resolve(&[("ANTHROPIC_API_KEY", "sk-ant-1")], None).unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.api_key, "sk-ant-1");
        assert_eq!(config.base_url, anthropic::DEFAULT_API_URL);
        assert_eq!(config.model, anthropic::DEFAULT_MODEL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_anthropic_key_fallback_name() {
        let config = resolve(&[("ANTHROPIC_KEY", "k2")], None).unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.api_key, "k2");
    }

    #[test]
    fn test_openai_key_selects_openai() {
        let config = resolve(&[("OPENAI_API_KEY", "sk-1")], None).unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.base_url, openai::DEFAULT_BASE_URL);
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn test_anthropic_wins_over_openai() {
        let config = resolve(
            &[("ANTHROPIC_API_KEY", "a"), ("OPENAI_API_KEY", "o")],
            None,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.api_key, "a");
    }

    #[test]
    fn test_explicit_backend_wins() {
        let config = resolve(
            &[
                ("LLM_BACKEND", "OpenAI"),
                ("ANTHROPIC_API_KEY", "a"),
                ("OPENAI_API_KEY", "o"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_key, "o");
    }

    #[test]
    fn test_override_key_defaults_to_anthropic() {
        let config = resolve(&[], Some("passed")).unwrap();
        assert_eq!(config.provider, Provider::Anthropic);
        assert_eq!(config.api_key, "passed");
    }

    #[test]
    fn test_llm_api_key_takes_precedence() {
        let config = resolve(&[("LLM_API_KEY", "explicit")], Some("passed")).unwrap();
        assert_eq!(config.api_key, "explicit");
    }

    #[test]
    fn test_proxy_key_parsing() {
        let config = resolve(&[("LLMPROXY_KEY", "user=alice&key=sk_123")], None).unwrap();
        assert_eq!(config.provider, Provider::OpenAI);
        assert_eq!(config.api_key, "sk_123");
        assert_eq!(config.user.as_deref(), Some("alice"));

        let (key, user) = parse_proxy_key("plainkey");
        assert_eq!(key, "plainkey");
        assert_eq!(user, None);
    }

    #[test]
    fn test_overrides_and_flags() {
        let config = resolve(
            &[
                ("OPENAI_API_KEY", "o"),
                ("LLM_BASE_URL", "http://localhost:8080/v1"),
                ("LLM_MODEL", "local-model"),
                ("LLM_TIMEOUT", "30"),
                ("LLM_SKIP_TLS_VERIFY", "true"),
            ],
            None,
        )
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "local-model");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.skip_tls_verify);
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        let config = resolve(&[("OPENAI_API_KEY", "o"), ("LLM_TIMEOUT", "soon")], None).unwrap();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_missing_keys() {
        assert!(matches!(
            resolve(&[], None),
            Err(ConfigError::MissingApiKey(_))
        ));
        assert!(matches!(
            resolve(&[("LLM_BACKEND", "anthropic"), ("OPENAI_API_KEY", "o")], None),
            Err(ConfigError::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_unknown_backend() {
        assert!(matches!(
            resolve(&[("LLM_BACKEND", "gemini")], None),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = BackendConfig::new(Provider::Anthropic, "secret");
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn test_create_client_uses_configured_model() {
        let mut config = BackendConfig::new(Provider::OpenAI, "k");
        config.model = "custom".into();
        config.user = Some("bob".into());
        let client = create_client(&config).unwrap();
        assert_eq!(client.model(), "custom");
    }
}
