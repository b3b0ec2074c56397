//! Query-Description Object
//!
//! The structured, store-agnostic representation of one scan/query
//! request. Built fresh per user request by the compiler, consumed once
//! by the store adapter, never cached.
//!
//! Maps use `BTreeMap` so serialization is key-ordered and a
//! serialize → parse → serialize round trip is byte-identical.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::query;
use crate::types::{Result, RiskError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Scan,
    Query,
}

/// Partition-key equality constraint, required for `query_type = query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKey {
    pub name: String,
    pub value: String,
}

/// One executable scan/query request against the article table.
///
/// Invariants (checked by [`QueryDescription::validate`]):
/// - `query_type = query` requires a partition key
/// - a filter expression using `#` aliases or `:` bindings requires the
///   corresponding map
/// - `projection_attributes` is always `None`: results are never
///   column-restricted
/// - `limit` is always present (schema default 200)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDescription {
    pub query_type: QueryType,
    #[serde(default)]
    pub partition_key: Option<PartitionKey>,
    #[serde(default)]
    pub filter_expression: Option<String>,
    #[serde(default)]
    pub expression_attribute_names: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub expression_attribute_values: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub projection_attributes: Option<Vec<String>>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub explanation: String,
}

fn default_limit() -> u32 {
    query::DEFAULT_LIMIT
}

impl Default for QueryDescription {
    /// The "show everything" fallback: full scan, no filter, schema
    /// default limit
    fn default() -> Self {
        Self {
            query_type: QueryType::Scan,
            partition_key: None,
            filter_expression: None,
            expression_attribute_names: None,
            expression_attribute_values: None,
            projection_attributes: None,
            limit: query::DEFAULT_LIMIT,
            explanation: query::DEFAULT_EXPLANATION.to_string(),
        }
    }
}

impl QueryDescription {
    /// Build a description from a model completion's JSON object,
    /// normalizing and validating it.
    ///
    /// The model is never trusted on projection: whatever it emitted is
    /// stripped here. A `null` limit is treated the same as an omitted
    /// one.
    pub fn from_model_value(mut value: Value) -> Result<Self> {
        if let Some(object) = value.as_object_mut()
            && object.get("limit").is_some_and(Value::is_null)
        {
            object.remove("limit");
        }

        let mut description: QueryDescription = serde_json::from_value(value)?;
        description.normalize();
        description.validate()?;
        Ok(description)
    }

    /// Enforce the always-true shape rules regardless of model output
    pub fn normalize(&mut self) {
        self.projection_attributes = None;

        if self
            .filter_expression
            .as_deref()
            .is_none_or(|expr| expr.trim().is_empty())
        {
            self.filter_expression = None;
            self.expression_attribute_names = None;
            self.expression_attribute_values = None;
        }
        if self.limit == 0 {
            self.limit = query::DEFAULT_LIMIT;
        }
    }

    /// Check the structural invariants
    pub fn validate(&self) -> Result<()> {
        if self.query_type == QueryType::Query && self.partition_key.is_none() {
            return Err(RiskError::InvalidQuery(
                "query type requires a partition_key".to_string(),
            ));
        }

        if let Some(expr) = &self.filter_expression {
            if expr.contains('#') && self.expression_attribute_names.is_none() {
                return Err(RiskError::InvalidQuery(
                    "filter expression uses #aliases but expression_attribute_names is null"
                        .to_string(),
                ));
            }
            if expr.contains(':') && self.expression_attribute_values.is_none() {
                return Err(RiskError::InvalidQuery(
                    "filter expression uses :bindings but expression_attribute_values is null"
                        .to_string(),
                ));
            }
        }

        if let Some(names) = &self.expression_attribute_names
            && names.keys().any(|k| !k.starts_with('#'))
        {
            return Err(RiskError::InvalidQuery(
                "attribute name aliases must start with '#'".to_string(),
            ));
        }
        if let Some(values) = &self.expression_attribute_values
            && values.keys().any(|k| !k.starts_with(':'))
        {
            return Err(RiskError::InvalidQuery(
                "attribute value bindings must start with ':'".to_string(),
            ));
        }

        Ok(())
    }
}
