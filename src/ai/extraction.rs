//! JSON Extraction from Model Completions
//!
//! Models asked for "ONLY valid JSON" still wrap their answer in prose,
//! code fences, or trailing commentary. Extraction runs an ordered list
//! of independent strategies and returns the first JSON object any of
//! them finds:
//!
//! 1. direct parse of the trimmed completion
//! 2. fenced code block (```json ... ```)
//! 3. first balanced `{...}` span (string-literal aware)
//! 4. greedy span from the first `{` to the last `}`
//!
//! A completion no strategy can parse yields `None`; callers degrade
//! locally (default query, empty stage fields) rather than erroring.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::debug;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced-block pattern is valid")
});

/// One extraction attempt: completion text in, JSON object out
pub type Strategy = fn(&str) -> Option<Value>;

/// Strategies in the order they are tried
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct", parse_direct),
    ("fenced_block", parse_fenced_block),
    ("balanced_braces", parse_balanced_braces),
    ("greedy_braces", parse_greedy_braces),
];

/// Extract the first JSON object found in a model completion
pub fn extract_json(raw: &str) -> Option<Value> {
    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(raw) {
            if *name != "direct" {
                debug!(strategy = *name, "recovered JSON from noisy completion");
            }
            return Some(value);
        }
    }
    None
}

fn parse_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

fn parse_direct(raw: &str) -> Option<Value> {
    parse_object(raw.trim())
}

fn parse_fenced_block(raw: &str) -> Option<Value> {
    FENCED_BLOCK
        .captures(raw)
        .and_then(|caps| parse_object(caps.get(1)?.as_str()))
}

/// Scan for the first `{` and walk to its matching close brace, skipping
/// braces inside string literals and escape sequences
fn parse_balanced_braces(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return parse_object(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_greedy_braces(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_parse() {
        let value = extract_json(r#"  {"Tag": "Current"}  "#).unwrap();
        assert_eq!(value, json!({"Tag": "Current"}));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(extract_json("[1, 2, 3]").is_none());
        assert!(extract_json("\"just a string\"").is_none());
        assert!(extract_json("42").is_none());
    }

    #[test]
    fn test_fenced_block_with_language_tag() {
        let raw = "Here is the result:\n```json\n{\"limit\": 200}\n```\nDone.";
        assert_eq!(parse_fenced_block(raw).unwrap(), json!({"limit": 200}));
        assert_eq!(extract_json(raw).unwrap(), json!({"limit": 200}));
    }

    #[test]
    fn test_fenced_block_without_language_tag() {
        let raw = "```\n{\"query_type\": \"scan\"}\n```";
        assert_eq!(extract_json(raw).unwrap(), json!({"query_type": "scan"}));
    }

    #[test]
    fn test_prose_wrapped_object() {
        let raw = "Sure! The query you want is {\"query_type\": \"scan\", \"limit\": 200} which scans everything.";
        assert_eq!(
            extract_json(raw).unwrap(),
            json!({"query_type": "scan", "limit": 200})
        );
    }

    #[test]
    fn test_balanced_scan_ignores_braces_in_strings() {
        let raw = r#"prefix {"explanation": "matches {curly} text", "limit": 5} suffix"#;
        assert_eq!(
            parse_balanced_braces(raw).unwrap(),
            json!({"explanation": "matches {curly} text", "limit": 5})
        );
    }

    #[test]
    fn test_balanced_scan_handles_escaped_quotes() {
        let raw = r#"{"explanation": "a \"quoted\" value"}"#;
        assert_eq!(
            parse_balanced_braces(raw).unwrap(),
            json!({"explanation": "a \"quoted\" value"})
        );
    }

    #[test]
    fn test_nested_objects() {
        let raw = r#"text before {"partition_key": {"name": "URL", "value": "x"}, "limit": 1} after"#;
        let value = extract_json(raw).unwrap();
        assert_eq!(value["partition_key"]["name"], "URL");
    }

    #[test]
    fn test_total_failures_yield_none() {
        assert!(extract_json("").is_none());
        assert!(extract_json("no json here at all").is_none());
        assert!(extract_json(r#"{"truncated": "mid"#).is_none());
        assert!(extract_json("} backwards {").is_none());
    }

    #[test]
    fn test_strategy_order_prefers_direct() {
        // A valid object that also contains a fence-looking suffix parses directly
        let raw = r#"{"explanation": "```json fences inside a string```"}"#;
        assert!(parse_direct(raw).is_some());
        assert!(extract_json(raw).is_some());
    }
}
