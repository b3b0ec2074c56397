//! RiskTag - LLM-Driven Article Query & Classification
//!
//! Translates free-text requests into structured queries against a
//! key-value store of crawled news articles, and classifies article
//! text against a closed insurance taxonomy using a hosted language
//! model.
//!
//! ## Core Components
//!
//! - **Query Compiler**: one deterministic model call turns natural
//!   language into a constrained query-description object; parse
//!   trouble degrades to "show everything", transport failure does not
//! - **Classification Pipeline**: summarize → classify → reflect →
//!   verify, each a model pass, with taxonomy compliance and the tag
//!   decision tree enforced locally
//! - **Batch Worker**: concurrent classification of untagged records
//!   with caller-level retry and per-article failure isolation
//!
//! ## Quick Start
//!
//! ```ignore
//! use risktag::{BedrockGateway, EnvTokenProvider, QueryCompiler, Taxonomy};
//!
//! let taxonomy = Taxonomy::builtin().into_shared();
//! let gateway = Arc::new(BedrockGateway::new(
//!     "https://bedrock-runtime.us-east-1.amazonaws.com",
//!     Box::new(EnvTokenProvider::new("RISKTAG_SESSION_TOKEN")),
//! )?);
//! let compiler = QueryCompiler::new(gateway, taxonomy, "anthropic.claude-sonnet-4-5-20250929-v1:0");
//! let description = compiler.compile("Show all articles tagged as Current").await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: model gateway boundary and JSON extraction
//! - [`query`]: natural-language query compilation
//! - [`classify`]: the multi-pass classification pipeline
//! - [`store`]: store adapter contract and in-memory implementation
//! - [`worker`]: batch classification
//! - [`taxonomy`]: the closed reference lists
//! - [`config`]: layered configuration

pub mod ai;
pub mod classify;
pub mod cli;
pub mod config;
pub mod constants;
pub mod query;
pub mod store;
pub mod taxonomy;
pub mod types;
pub mod worker;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{ClassificationConfig, Config, ConfigLoader, GatewayConfig, TaxonomyConfig};

// Error Types
pub use types::{ArticleRecord, ArticleUpdate, Result, RiskError, Tag};

// Taxonomy
pub use taxonomy::{NaicsEntry, Taxonomy};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use classify::{Classification, ClassificationPipeline, assign_tag};
pub use query::{PartitionKey, QueryCompiler, QueryDescription, QueryType};
pub use worker::{BatchClassifier, BatchConfig, BatchReport};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{BedrockGateway, EnvTokenProvider, LlmGateway, TokenProvider, extract_json};

// =============================================================================
// Store Re-exports
// =============================================================================

pub use store::{MemoryStore, Page, ScanParams, StoreAdapter};
