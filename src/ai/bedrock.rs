//! Hosted Model Runtime Gateway
//!
//! HTTP implementation of [`LlmGateway`] against a Bedrock-style invoke
//! endpoint (`POST {endpoint}/model/{model_id}/invoke` with a chat
//! message body). Handles session-token caching and renewal; fails closed
//! on transport or credential errors. No retry logic lives here.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::{debug, info, warn};

use super::gateway::LlmGateway;
use crate::constants::model;
use crate::types::{Result, RiskError};

/// Tokens are renewed this long before their stated expiry
const EXPIRY_SKEW_SECS: i64 = 60;

// =============================================================================
// Session Tokens
// =============================================================================

/// A bearer token plus its expiry, as issued by a [`TokenProvider`]
#[derive(Clone)]
pub struct SessionToken {
    pub token: SecretString,
    /// `None` means the token never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn perpetual(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            expires_at: None,
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS) >= at,
            None => false,
        }
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Credential source for the gateway session.
///
/// Called once at startup and again whenever the cached token expires or
/// the endpoint rejects it.
pub trait TokenProvider: Send + Sync {
    fn issue(&self) -> Result<SessionToken>;
}

/// Default provider: reads the token from an environment variable
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenProvider for EnvTokenProvider {
    fn issue(&self) -> Result<SessionToken> {
        let raw = std::env::var(&self.var).map_err(|_| {
            RiskError::Auth(format!(
                "session token not found: set the {} environment variable",
                self.var
            ))
        })?;
        if raw.trim().is_empty() {
            return Err(RiskError::Auth(format!("{} is set but empty", self.var)));
        }
        Ok(SessionToken::perpetual(raw))
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Gateway to a chat-style model invoke endpoint
pub struct BedrockGateway {
    endpoint: url::Url,
    client: reqwest::Client,
    provider: Box<dyn TokenProvider>,
    cached: RwLock<Option<SessionToken>>,
}

impl std::fmt::Debug for BedrockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockGateway")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl BedrockGateway {
    pub fn new(endpoint_url: &str, provider: Box<dyn TokenProvider>) -> Result<Self> {
        let endpoint = url::Url::parse(endpoint_url)
            .map_err(|e| RiskError::Config(format!("invalid endpoint URL '{}': {}", endpoint_url, e)))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(model::REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| RiskError::Gateway(format!("failed to create HTTP client: {}", e)))?;

        // Fail closed: verify credentials are obtainable before first use
        let initial = provider.issue()?;
        info!("model gateway initialized for {}", endpoint);

        Ok(Self {
            endpoint,
            client,
            provider,
            cached: RwLock::new(Some(initial)),
        })
    }

    /// Current bearer token, renewing through the provider when expired
    fn bearer_token(&self) -> Result<SecretString> {
        {
            let cached = self
                .cached
                .read()
                .map_err(|_| RiskError::Auth("token cache poisoned".to_string()))?;
            if let Some(token) = cached.as_ref()
                && !token.is_expired()
            {
                return Ok(token.token.clone());
            }
        }

        debug!("session token expired, renewing");
        let fresh = self.provider.issue()?;
        let token = fresh.token.clone();
        let mut cached = self
            .cached
            .write()
            .map_err(|_| RiskError::Auth("token cache poisoned".to_string()))?;
        *cached = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token so the next call re-issues credentials
    fn invalidate_token(&self) {
        if let Ok(mut cached) = self.cached.write() {
            *cached = None;
        }
    }

    fn invoke_url(&self, model_id: &str) -> Result<url::Url> {
        self.endpoint
            .join(&format!("model/{}/invoke", model_id))
            .map_err(|e| RiskError::Config(format!("invalid model id '{}': {}", model_id, e)))
    }
}

#[async_trait]
impl LlmGateway for BedrockGateway {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let token = self.bearer_token()?;
        let url = self.invoke_url(model_id)?;
        let request = InvokeRequest::user_message(prompt, max_tokens, temperature);

        debug!(model_id, max_tokens, "invoking model");

        let response = self
            .client
            .post(url)
            .bearer_auth(token.expose_secret())
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RiskError::Gateway(format!("model request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            self.invalidate_token();
            let body = response.text().await.unwrap_or_default();
            return Err(RiskError::Auth(format!(
                "model endpoint rejected credentials ({}): {}",
                status, body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RiskError::Gateway(format!(
                "model endpoint error ({}): {}",
                status, body
            )));
        }

        let body: InvokeResponse = response
            .json()
            .await
            .map_err(|e| RiskError::Gateway(format!("malformed model response: {}", e)))?;

        match body.content.into_iter().find_map(|block| block.text) {
            Some(text) => Ok(text),
            None => {
                warn!(model_id, "model response contained no text block");
                Err(RiskError::Gateway(
                    "model response contained no text block".to_string(),
                ))
            }
        }
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct InvokeRequest {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

impl InvokeRequest {
    fn user_message(prompt: &str, max_tokens: u32, temperature: f32) -> Self {
        Self {
            anthropic_version: model::ANTHROPIC_VERSION,
            max_tokens,
            temperature,
            messages: vec![Message {
                role: "user",
                content: prompt.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider(Option<DateTime<Utc>>);

    impl TokenProvider for FixedProvider {
        fn issue(&self) -> Result<SessionToken> {
            Ok(SessionToken {
                token: SecretString::from("tok"),
                expires_at: self.0,
            })
        }
    }

    #[test]
    fn test_expiry_includes_skew() {
        let soon = SessionToken {
            token: SecretString::from("t"),
            expires_at: Some(Utc::now() + Duration::seconds(30)),
        };
        assert!(soon.is_expired());

        let later = SessionToken {
            token: SecretString::from("t"),
            expires_at: Some(Utc::now() + Duration::seconds(3600)),
        };
        assert!(!later.is_expired());
        assert!(!SessionToken::perpetual("t").is_expired());
    }

    #[test]
    fn test_gateway_fails_closed_without_credentials() {
        struct Failing;
        impl TokenProvider for Failing {
            fn issue(&self) -> Result<SessionToken> {
                Err(RiskError::Auth("no credentials".to_string()))
            }
        }
        let result = BedrockGateway::new("https://bedrock.test", Box::new(Failing));
        assert!(matches!(result, Err(RiskError::Auth(_))));
    }

    #[test]
    fn test_token_renewal_replaces_expired_cache() {
        let gateway = BedrockGateway::new(
            "https://bedrock.test",
            Box::new(FixedProvider(Some(Utc::now() - Duration::seconds(10)))),
        )
        .unwrap();
        // Cached token is already expired; bearer_token must renew, not fail
        assert!(gateway.bearer_token().is_ok());
    }

    #[test]
    fn test_invoke_url_shape() {
        let gateway = BedrockGateway::new(
            "https://bedrock-runtime.us-east-1.amazonaws.com",
            Box::new(FixedProvider(None)),
        )
        .unwrap();
        let url = gateway.invoke_url("anthropic.claude-sonnet-4-5-20250929-v1:0").unwrap();
        assert_eq!(
            url.as_str(),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/anthropic.claude-sonnet-4-5-20250929-v1:0/invoke"
        );
    }

    #[test]
    fn test_response_takes_first_text_block() {
        let body: InvokeResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking"},{"type":"text","text":"hello"}]}"#,
        )
        .unwrap();
        let text = body.content.into_iter().find_map(|b| b.text);
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = SessionToken::perpetual("super-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
