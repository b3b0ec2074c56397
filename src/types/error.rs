//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Failure taxonomy
//!
//! - **Gateway / Auth**: model endpoint transport or credential failures.
//!   These are hard errors: the query compiler propagates them, the
//!   classification pipeline folds them into a `Processing Error` outcome.
//! - **Store**: execution failures from the backing store, including
//!   malformed filter expressions that only surface at execution time.
//! - **InvalidQuery / InvalidInput / Config**: caller-side problems that
//!   should fail fast.
//!
//! Unparsable model output is deliberately NOT an error variant: the
//! extraction layer returns `Option` and each consumer degrades locally
//! (default query, empty stage fields).

use thiserror::Error;

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Debug, Error)]
pub enum RiskError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Gateway Errors
    // -------------------------------------------------------------------------
    /// Transport-level failure talking to the model endpoint
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Credential or session failure at the model endpoint
    #[error("Gateway auth error: {0}")]
    Auth(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// A query-description violated its structural invariants
    #[error("Invalid query description: {0}")]
    InvalidQuery(String),

    /// Store-side execution failure (scan/query/update)
    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    /// Input rejected before any model call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),
}

impl RiskError {
    /// True for failures at the model-endpoint boundary (transport or auth).
    ///
    /// The classification worker uses this to decide whether a failed
    /// article is worth a retry; parse-level degradation never is.
    pub fn is_gateway(&self) -> bool {
        matches!(self, RiskError::Gateway(_) | RiskError::Auth(_))
    }
}
