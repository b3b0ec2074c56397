//! AI Integration Layer
//!
//! The language-model gateway boundary and the shared machinery for
//! turning noisy completions back into structured data.

pub mod bedrock;
pub mod extraction;
pub mod gateway;

pub use bedrock::{BedrockGateway, EnvTokenProvider, SessionToken, TokenProvider};
pub use extraction::{STRATEGIES, Strategy, extract_json};
pub use gateway::LlmGateway;
