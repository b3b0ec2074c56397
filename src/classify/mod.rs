//! Article Classification
//!
//! Multi-pass classification of article text against the reference
//! taxonomy: summarize, classify, reflect, verify-and-tag. The decision
//! tree lives in [`tag`] as a pure function; outcome validation lives in
//! [`outcome`].

pub mod outcome;
pub mod pipeline;
pub mod prompts;
pub mod tag;

pub use outcome::{CandidateFields, Classification};
pub use pipeline::ClassificationPipeline;
pub use tag::{assign_tag, default_reasoning};
