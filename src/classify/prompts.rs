//! Classification Stage Prompts
//!
//! One builder per pipeline stage: summarize, classify, reflect, final
//! verification. Each embeds the reference taxonomy in full — unlike the
//! query prompt, classification accuracy depends on the model seeing
//! every allowed value.

use crate::classify::outcome::CandidateFields;
use crate::taxonomy::Taxonomy;

const SUMMARY_PROMPT: &str = r#"<role>You are a senior insurance industry analyst with 15+ years of experience in risk assessment and claims analysis.</role>

<task>
Analyze the provided article and create a concise summary that highlights insurance-relevant risks, exposures, and potential claims scenarios.
</task>

<instructions>
1. Focus specifically on:
   - Physical risks and hazards
   - Financial exposures
   - Liability concerns
   - Business interruption factors
   - Regulatory or compliance issues

2. Write 2-3 clear, professional sentences
3. Use insurance industry terminology where appropriate
4. Prioritize actionable insights over general observations
</instructions>

<output_format>
Return ONLY valid JSON in this exact structure:
{"ReasonIdentified": "<your 2-3 sentence summary here>"}
</output_format>

<article>
{text}
</article>"#;

const CLASSIFY_PROMPT: &str = r#"<role>You are an expert insurance claims analyst specializing in risk categorization and industry classification.</role>

<task>
Classify the provided article content by matching it against the reference categories. Only select categories that have strong, direct relevance to the content.
</task>

<classification_process>
1. First, scan for any CONCERNS from the reference list ONLY
2. If concerns are found, then evaluate other categories from their respective reference lists ONLY
3. If NO concerns are identified, return empty arrays for all categories
4. For NAICS codes, select the single most relevant match from the provided NAICS reference data ONLY
5. STRICTLY use only items that appear in the reference lists - do NOT create or infer new categories
</classification_process>

<reference_data>
Concerns: {concerns_events}
Emerging Risks: {emerging_risks_ref}
Misc Topics: {misc_topics_ref}
NAICS Codes: {naics_data}
</reference_data>

<matching_criteria>
- Concerns: Must be an EXACT MATCH from the provided concerns reference list
- Emerging Risks: Must be an EXACT MATCH from the provided emerging risks reference list
- Misc Topics: Must be an EXACT MATCH from the provided misc topics reference list
- NAICS: Must be an EXACT MATCH from the provided NAICS reference data (code and description)
- DO NOT create new categories or variations - use ONLY what is provided in reference lists
</matching_criteria>

<output_format>
Return ONLY valid JSON in this exact structure:
{
  "Concerns": ["array of matched concerns from reference list only"],
  "EmergingRiskName": ["array of matched emerging risks from reference list only"],
  "MiscTopics": ["array of matched misc topics from reference list only"],
  "NAICSCODE": "single best matching code or null",
  "NAICSDescription": "corresponding description or null"
}
</output_format>

<article>
{text}
</article>"#;

const REFLECT_PROMPT: &str = r#"<role>You are a senior quality assurance reviewer with expertise in insurance data validation.</role>

<task>
Review and validate the extracted classifications for accuracy, consistency, and adherence to reference data.
</task>

<validation_checklist>
1. Verify all items exist in the reference data
2. Ensure NAICS code and description are properly paired
3. Remove any items that don't have strong textual support
4. Check for logical consistency between categories
5. Maintain conservative classification standards (80 percent and more confidence)
</validation_checklist>

<reference_data>
Concerns: {concerns_events}
Emerging Risks: {emerging_risks_ref}
Misc Topics: {misc_topics_ref}
NAICS Codes: {naics_data}
</reference_data>

<correction_rules>
- MANDATORY: Remove any items not found EXACTLY in the reference lists
- MANDATORY: Only use items that appear word-for-word in the provided reference data
- If NAICS code present, description must match exactly from reference data
- Empty arrays are preferred over incorrect classifications
- NEVER add items that are not explicitly listed in the reference data
</correction_rules>

<input_data>
{data}
</input_data>

<output_format>
Return ONLY the corrected JSON with the same structure as input.
</output_format>"#;

const FINAL_VERIFICATION_PROMPT: &str = r#"<role>You are an expert insurance analyst conducting final verification and strategic tagging of classified articles.</role>

<context>
Original Article Data: {data}
Current Summary: {reason_identified}
Current Classifications:
- Concerns: {concerns}
- Emerging Risks: {emerging_risks}
- Misc Topics: {misc_topics}
- NAICS Code: {naics_code}
- NAICS Description: {naics_description}
</context>

<reference_data>
Concerns Events: {concerns_events}
Emerging Risks: {emerging_risks_ref}
Misc Topics: {misc_topics_ref}
NAICS Data: {naics_data}
</reference_data>

<verification_process>
1. STRICT COMPLIANCE CHECK: Verify every single item exists EXACTLY in reference lists
2. Refine summary to be more precise and actionable
3. REMOVE any items not found word-for-word in reference data
4. Apply tagging strategy based on verified, compliant results
5. ZERO TOLERANCE for items outside the provided reference lists
</verification_process>

<tagging_strategy>
IF Concerns are identified:
  - IF Emerging Risks are also present:
    - IF Misc Topics exist -> Tag: 'Potential New Trend'
    - IF no Misc Topics -> Tag: 'Current'
  - IF no Emerging Risks -> Tag: 'Potential New Trend'
ELSE:
  - Tag: 'Untagged'
</tagging_strategy>

<output_requirements>
1. CRITICAL: Use ONLY items that appear exactly in the provided reference lists
2. Apply tagging strategy logically based on compliant classifications
3. Explain reasoning clearly and concisely
4. NEVER create, modify, or infer categories beyond what's explicitly provided
5. Empty classifications are acceptable - non-compliant ones are not
</output_requirements>

<output_format>
Return ONLY valid JSON in this exact structure:
{
    "ReasonIdentified": "refined and precise summary",
    "Concerns": ["high-confidence concerns only"],
    "EmergingRiskName": ["high-confidence risks only"],
    "MiscTopics": ["high-confidence misc topics only"],
    "NAICSCODE": "best matching code or null",
    "NAICSDescription": "exact corresponding description or null",
    "Tag": "tag based on strategy logic",
    "TaggingReasoning": "clear explanation of tag selection based on classification results"
}
</output_format>"#;

/// Fill the four reference-data slots shared by every stage template.
/// Context placeholders (`{concerns}`, `{emerging_risks}`, ...) are left
/// for the per-stage builders.
fn with_reference_data(template: &str, taxonomy: &Taxonomy) -> String {
    template
        .replace("{concerns_events}", &taxonomy.concerns().join(", "))
        .replace("{emerging_risks_ref}", &taxonomy.emerging_risks().join(", "))
        .replace("{misc_topics_ref}", &taxonomy.misc_topics_joined())
        .replace("{naics_data}", &taxonomy.naics_joined())
}

/// Stage 1: insurance-relevant summary
pub fn summary_prompt(text: &str) -> String {
    SUMMARY_PROMPT.replace("{text}", text)
}

/// Stage 2: candidate classification against the full taxonomy
pub fn classify_prompt(taxonomy: &Taxonomy, text: &str) -> String {
    with_reference_data(CLASSIFY_PROMPT, taxonomy).replace("{text}", text)
}

/// Stage 3: reflection over the stage-2 output
pub fn reflect_prompt(taxonomy: &Taxonomy, stage_output: &str) -> String {
    with_reference_data(REFLECT_PROMPT, taxonomy).replace("{data}", stage_output)
}

/// Stage 4: final compliance check and tagging
pub fn final_verification_prompt(
    taxonomy: &Taxonomy,
    article_text: &str,
    fields: &CandidateFields,
) -> String {
    with_reference_data(FINAL_VERIFICATION_PROMPT, taxonomy)
        .replace("{data}", article_text)
        .replace(
            "{reason_identified}",
            fields.reason_identified.as_deref().unwrap_or("None"),
        )
        .replace("{concerns}", &join_or_none(&fields.concerns))
        .replace("{emerging_risks}", &join_or_none(&fields.emerging_risks))
        .replace("{misc_topics}", &join_or_none(&fields.misc_topics))
        .replace("{naics_code}", fields.naics_code.as_deref().unwrap_or("None"))
        .replace(
            "{naics_description}",
            fields.naics_description.as_deref().unwrap_or("None"),
        )
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "None".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_prompt_embeds_full_taxonomy() {
        let tax = Taxonomy::builtin();
        let prompt = classify_prompt(&tax, "A factory fire caused injuries.");

        // Full lists, no truncation marker in the reference block
        for concern in tax.concerns() {
            assert!(prompt.contains(concern.as_str()));
        }
        for risk in tax.emerging_risks() {
            assert!(prompt.contains(risk.as_str()));
        }
        assert!(prompt.contains("A factory fire caused injuries."));
        assert!(!prompt.contains("{text}"));
        assert!(!prompt.contains("{concerns_events}"));
    }

    #[test]
    fn test_final_prompt_renders_empty_fields_as_none() {
        let tax = Taxonomy::builtin();
        let fields = CandidateFields::default();
        let prompt = final_verification_prompt(&tax, "article body", &fields);

        assert!(prompt.contains("- Concerns: None"));
        assert!(prompt.contains("- NAICS Code: None"));
        assert!(prompt.contains("Original Article Data: article body"));
        assert!(prompt.contains("'Potential New Trend'"));
        // Context slots and reference slots are distinct: the reference
        // block is filled while the context block reflects the fields
        assert!(prompt.contains("PFAS"));
        assert!(prompt.contains("- Emerging Risks: None"));
        for placeholder in [
            "{concerns_events}",
            "{emerging_risks_ref}",
            "{emerging_risks}",
            "{misc_topics_ref}",
            "{misc_topics}",
            "{naics_data}",
            "{data}",
        ] {
            assert!(!prompt.contains(placeholder), "unresolved {}", placeholder);
        }
    }

    #[test]
    fn test_reflect_prompt_carries_stage_output() {
        let tax = Taxonomy::builtin();
        let prompt = reflect_prompt(&tax, r#"{"Concerns": ["lawsuits"]}"#);
        assert!(prompt.contains(r#"{"Concerns": ["lawsuits"]}"#));
    }
}
