//! Store Adapter Boundary
//!
//! The backing table is an external key-value/document service; this
//! module owns only the consumed contract: scan/query with filter
//! parameters and continuation tokens, plus targeted record updates.
//! [`execute`] drives a query-description against an adapter,
//! accumulating pages until the requested limit or end-of-data.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::query::{PartitionKey, QueryDescription, QueryType};
use crate::types::{ArticleRecord, ArticleUpdate, Result};

pub use memory::MemoryStore;

/// One page of scan/query results
#[derive(Debug, Clone)]
pub struct Page {
    pub rows: Vec<ArticleRecord>,
    /// Opaque token for the next page; `None` means end-of-data
    pub next: Option<String>,
}

/// Filter parameters shared by scan and query calls
#[derive(Debug, Clone, Default)]
pub struct ScanParams {
    pub filter_expression: Option<String>,
    pub attribute_names: Option<BTreeMap<String, String>>,
    pub attribute_values: Option<BTreeMap<String, Value>>,
    pub limit: u32,
    pub start_token: Option<String>,
}

impl ScanParams {
    pub fn from_description(description: &QueryDescription) -> Self {
        Self {
            filter_expression: description.filter_expression.clone(),
            attribute_names: description.expression_attribute_names.clone(),
            attribute_values: description.expression_attribute_values.clone(),
            limit: description.limit,
            start_token: None,
        }
    }

    /// Canned sweep for records needing classification. The store-side
    /// filter covers `Untagged` and attribute-absent; empty-string tags
    /// cannot be expressed here and are post-filtered by the worker.
    pub fn untagged_sweep(limit: u32) -> Self {
        Self {
            filter_expression: Some(
                "#tag = :untagged OR attribute_not_exists(#tag)".to_string(),
            ),
            attribute_names: Some(BTreeMap::from([("#tag".to_string(), "Tag".to_string())])),
            attribute_values: Some(BTreeMap::from([(
                ":untagged".to_string(),
                Value::String("Untagged".to_string()),
            )])),
            limit,
            start_token: None,
        }
    }
}

/// Consumed store contract. Implementations execute filter expressions
/// themselves; a malformed expression surfaces here as
/// [`crate::types::RiskError::Store`], never earlier.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    async fn scan(&self, params: &ScanParams) -> Result<Page>;

    async fn query(&self, partition_key: &PartitionKey, params: &ScanParams) -> Result<Page>;

    /// Merge non-null fields into the record with this URL (latest
    /// `DateTime` row when several exist)
    async fn update_article(&self, url: &str, update: &ArticleUpdate) -> Result<()>;
}

/// Execute one query-description, accumulating pages until `limit` rows
/// are collected or the continuation token runs out
pub async fn execute(
    store: &dyn StoreAdapter,
    description: &QueryDescription,
) -> Result<Vec<ArticleRecord>> {
    let limit = description.limit as usize;
    let mut params = ScanParams::from_description(description);
    let mut rows: Vec<ArticleRecord> = Vec::new();

    loop {
        let page = match (description.query_type, &description.partition_key) {
            (QueryType::Query, Some(partition_key)) => store.query(partition_key, &params).await?,
            _ => store.scan(&params).await?,
        };
        rows.extend(page.rows);

        match page.next {
            Some(token) if rows.len() < limit => params.start_token = Some(token),
            _ => break,
        }
    }

    rows.truncate(limit);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryDescription;

    fn seeded_store(count: usize, page_size: usize) -> MemoryStore {
        let records = (0..count)
            .map(|i| {
                ArticleRecord::new(
                    format!("https://example.com/{}", i),
                    format!("2025-11-{:02}T00:00:00Z", (i % 28) + 1),
                )
            })
            .collect();
        MemoryStore::with_page_size(records, page_size)
    }

    #[tokio::test]
    async fn test_execute_accumulates_pages_until_limit() {
        let store = seeded_store(25, 4);
        let description = QueryDescription {
            limit: 10,
            ..QueryDescription::default()
        };

        let rows = execute(&store, &description).await.unwrap();
        assert_eq!(rows.len(), 10);
    }

    #[tokio::test]
    async fn test_execute_stops_at_end_of_data() {
        let store = seeded_store(7, 3);
        let description = QueryDescription {
            limit: 200,
            ..QueryDescription::default()
        };

        let rows = execute(&store, &description).await.unwrap();
        assert_eq!(rows.len(), 7);
    }

    #[tokio::test]
    async fn test_untagged_sweep_params_shape() {
        let params = ScanParams::untagged_sweep(50);
        assert!(params.filter_expression.as_deref().unwrap().contains("attribute_not_exists"));
        assert_eq!(params.attribute_names.as_ref().unwrap()["#tag"], "Tag");
        assert_eq!(params.limit, 50);
    }
}
