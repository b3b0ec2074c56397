//! Query-Generation Prompt
//!
//! Builds the single prompt that turns a free-text request into a
//! query-description object: fixed table schema, sampled taxonomy,
//! operator rules, and worked examples. The concerns and emerging-risks
//! lists are truncated to a fixed preview so prompt size stays bounded;
//! misc topics and the NAICS table are embedded in full.

use crate::constants::query;
use crate::taxonomy::Taxonomy;

const TABLE_SCHEMA: &str = r#"Table Name: CrawledData

Primary Key:
- Partition Key: URL (String) - The unique URL of the crawled article
- Sort Key: DateTime (String) - ISO 8601 timestamp when the article was processed

Attributes:
- Title (String): Title of the article
- Source (String): Source website/publication of the article
- URL (String): The web address of the article
- Data (String): Full text content of the article
- Description (String): Brief description or excerpt from the article
- ReasonIdentified (String): AI-generated summary focusing on insurance-relevant risks and exposures
- Concerns (String): Semicolon-separated list of identified concern events (e.g., "injuries;property damage;lawsuits")
- EmergingRiskName (String): Semicolon-separated list of emerging risk categories (e.g., "Climate Change;PFAS;Ransomware")
- MiscTopics (String): Semicolon-separated list of miscellaneous insurance topics (e.g., "home ownership;personal auto")
- NAICSCODE (String): Industry classification code (e.g., "327910")
- NAICSDescription (String): Description of the NAICS code industry (e.g., "Abrasive Product Manufacturing")
- Tag (String): Classification tag - one of: "Current", "Potential New Trend", "Untagged", "Processing Error"

Available Values for Classification Fields:
- Concerns: {concerns}
- Emerging Risks: {emerging_risks}
- Misc Topics: {misc_topics}
- NAICS Codes: {naics_data}"#;

const QUERY_GENERATION_PROMPT: &str = r##"<role>You are an expert at converting natural language queries into key-value store filter expressions and query parameters.</role>

<table_schema>
{schema}
</table_schema>

<task>
Convert the following user query into a structured JSON response that can be used to query the table.
</task>

<user_query>
{query}
</user_query>

<instructions>
1. Analyze the user's intent and identify which fields they're querying
2. Determine if this is a simple scan with filters or if specific keys are mentioned
3. For concerns, emerging risks, or misc topics - match against the available values provided in the schema
4. Generate appropriate filter expressions using this syntax only:
   - Use "attribute_exists(field)" / "attribute_not_exists(field)" to check field presence
   - Use "contains(field, value)" for substring matching on semicolon-separated fields
   - The store does NOT support functions like lower() or upper()
   - For case-insensitive intent, assume data is pre-normalized (e.g., stored lowercase) or leave filtering to the application layer
   - Use "field = value" for exact matching
   - Use "begins_with(field, value)" for prefix matching
   - Use "field IN (value1, value2)" for multiple value matching
   - Use "AND", "OR" for combining conditions
5. For date ranges, convert to ISO format and use comparison operators
6. ALWAYS set projection_attributes to null - we ALWAYS want ALL columns returned
</instructions>

<output_format>
Return ONLY valid JSON in this exact structure:

{
    "query_type": "scan" or "query",
    "partition_key": {"name": "URL", "value": "specific_url"} or null,
    "filter_expression": "filter expression string" or null,
    "expression_attribute_names": {"#tag": "Tag", "#concerns": "Concerns"} or null,
    "expression_attribute_values": {":tag_val": "Current", ":concern_val": "injuries"} or null,
    "projection_attributes": null,
    "limit": 200,
    "explanation": "Brief explanation of what the query does"
}

IMPORTANT: projection_attributes MUST ALWAYS be null - we always return ALL columns from the database.
</output_format>

<examples>
User Query: "Show me all articles tagged as Current"
Response:
{
    "query_type": "scan",
    "partition_key": null,
    "filter_expression": "#tag = :tag_val",
    "expression_attribute_names": {"#tag": "Tag"},
    "expression_attribute_values": {":tag_val": "Current"},
    "projection_attributes": null,
    "limit": 200,
    "explanation": "Scanning for all records where Tag equals 'Current'"
}

User Query: "Find articles about climate change with PFAS concerns"
Response:
{
    "query_type": "scan",
    "partition_key": null,
    "filter_expression": "contains(#emerg, :emerg_val1) AND contains(#emerg, :emerg_val2)",
    "expression_attribute_names": {"#emerg": "EmergingRiskName"},
    "expression_attribute_values": {":emerg_val1": "Climate Change", ":emerg_val2": "PFAS"},
    "projection_attributes": null,
    "limit": 200,
    "explanation": "Finding articles with both Climate Change and PFAS in emerging risks"
}

User Query: "Show articles about lawsuits or property damage"
Response:
{
    "query_type": "scan",
    "partition_key": null,
    "filter_expression": "contains(#concerns, :concern1) OR contains(#concerns, :concern2)",
    "expression_attribute_names": {"#concerns": "Concerns"},
    "expression_attribute_values": {":concern1": "lawsuits", ":concern2": "property damage"},
    "projection_attributes": null,
    "limit": 200,
    "explanation": "Finding articles containing lawsuits or property damage concerns"
}

User Query: "Show all articles"
Response:
{
    "query_type": "scan",
    "partition_key": null,
    "filter_expression": null,
    "expression_attribute_names": null,
    "expression_attribute_values": null,
    "projection_attributes": null,
    "limit": 200,
    "explanation": "Retrieving all articles from the database"
}
</examples>

<critical_rules>
- For Concerns, Emerging Risks, and Misc Topics: ALWAYS use values from the available lists in the schema
- Use "contains()" for fields that store semicolon-separated values
- Field names starting with uppercase letters need attribute name placeholders (#fieldname)
- Always include "limit" to prevent overwhelming results
- Set query_type to "query" ONLY if a partition key (URL) is specifically mentioned
- For untagged records: filter_expression should check for Tag being "Untagged" OR attribute_not_exists(Tag).
  (Empty string values must be handled in the application layer, not in the store filter.)
- CRITICAL: projection_attributes MUST ALWAYS be null - never restrict columns, always return ALL attributes
- expression_attribute_names should be null if no filter_expression uses them
- expression_attribute_values should be null if no filter_expression uses them
</critical_rules>"##;

/// Table schema with the sampled taxonomy embedded
pub fn table_schema(taxonomy: &Taxonomy) -> String {
    TABLE_SCHEMA
        .replace(
            "{concerns}",
            &taxonomy.concerns_preview(query::TAXONOMY_PREVIEW_LEN),
        )
        .replace(
            "{emerging_risks}",
            &taxonomy.emerging_risks_preview(query::TAXONOMY_PREVIEW_LEN),
        )
        .replace("{misc_topics}", &taxonomy.misc_topics_joined())
        .replace("{naics_data}", &taxonomy.naics_joined())
}

/// Full compilation prompt for one user request
pub fn query_generation_prompt(taxonomy: &Taxonomy, user_text: &str) -> String {
    QUERY_GENERATION_PROMPT
        .replace("{schema}", &table_schema(taxonomy))
        .replace("{query}", user_text)
}
