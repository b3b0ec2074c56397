//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Model invocation constants
pub mod model {
    /// Default model identifier sent to the gateway
    pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-sonnet-4-5-20250929-v1:0";

    /// Default invoke endpoint for the hosted model runtime
    pub const DEFAULT_ENDPOINT_URL: &str = "https://bedrock-runtime.us-east-1.amazonaws.com";

    /// Wire version tag expected by the chat-style invoke endpoint
    pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

    /// Token budget for classification-stage completions
    pub const CLASSIFY_MAX_TOKENS: u32 = 1000;

    /// Token budget for query-compilation completions (a single JSON object)
    pub const QUERY_MAX_TOKENS: u32 = 2000;

    /// All core calls are deterministic
    pub const TEMPERATURE: f32 = 0.0;

    /// HTTP request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}

/// Query compilation constants
pub mod query {
    /// Schema-level default result limit, injected when the model omits one
    pub const DEFAULT_LIMIT: u32 = 200;

    /// Entries of the concerns/risks lists embedded in the query prompt
    /// before truncation with an ellipsis marker
    pub const TAXONOMY_PREVIEW_LEN: usize = 20;

    /// Explanation attached to the fallback "show everything" description
    pub const DEFAULT_EXPLANATION: &str = "Showing all records (default query)";
}

/// Article-text limits applied before prompting
pub mod limits {
    /// Maximum characters of the `Data` field fed to a prompt
    pub const MAX_TEXT_CHARS: usize = 50_000;

    /// Minimum characters required for classification
    pub const MIN_TEXT_CHARS: usize = 50;
}

/// Batch worker constants
pub mod batch {
    /// Default number of untagged records processed per sweep
    pub const DEFAULT_BATCH_SIZE: usize = 5;

    /// Default concurrent classifications
    pub const DEFAULT_CONCURRENCY: usize = 2;

    /// Caller-level retry attempts for gateway-failed articles
    pub const MAX_RETRY_ATTEMPTS: usize = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const RETRY_MAX_DELAY_SECS: u64 = 30;
}
