//! Language-Model Gateway Contract
//!
//! The single synchronous call boundary both core components depend on:
//! one prompt in, one raw completion out. The gateway wraps transport and
//! session handling only — it never retries and never interprets the
//! completion. Retry policy, when wanted, belongs to the caller (see
//! [`crate::worker`]).

use async_trait::async_trait;

use crate::types::Result;

/// Chat-style completion boundary.
///
/// Implementations raise [`crate::types::RiskError::Gateway`] or
/// [`crate::types::RiskError::Auth`] on transport/credential failure and
/// otherwise return the raw completion text verbatim.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(
        &self,
        model_id: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}
