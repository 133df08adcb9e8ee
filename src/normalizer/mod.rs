// src/normalizer/mod.rs
pub mod schema;
pub mod score;

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::TransformError;
use crate::llm::{strip_code_fences, CompletionClient};
use crate::models::RawDataBag;
use crate::normalizer::schema::CanonicalRecord;
use crate::normalizer::score::quality_score;

/// Merges every raw source into one canonical JSON record via the completion
/// collaborator, validates structural completeness, and computes the data
/// quality score locally.
pub struct NormalizationEngine {
    llm: Arc<dyn CompletionClient>,
    temperature: f32,
    max_tokens: u32,
}

impl NormalizationEngine {
    pub fn new(llm: Arc<dyn CompletionClient>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            llm,
            temperature,
            max_tokens,
        }
    }

    pub async fn transform(&self, raw: &RawDataBag) -> Result<CanonicalRecord, TransformError> {
        info!("Starting data transformation for: {}", raw.company_name);
        if raw.is_empty() {
            warn!(
                "No acquisition stage produced data for {}; transforming from the name alone",
                raw.company_name
            );
        }

        let prompt = build_transformation_prompt(&prepare_input(raw));
        let response = self
            .llm
            .complete(&prompt, self.temperature, self.max_tokens)
            .await?;

        let mut record = parse_and_validate(&response)?;

        record.enrichment_timestamp = Some(Utc::now().timestamp());
        if record
            .campaign_status
            .as_deref()
            .map(str::is_empty)
            .unwrap_or(true)
        {
            record.campaign_status = Some("Data Ready".to_string());
        }
        record.data_quality_score = Some(quality_score(&record));

        info!(
            "Transformation complete for {} (quality score: {})",
            record.company.name,
            record.data_quality_score.unwrap_or(0)
        );
        Ok(record)
    }
}

/// Concatenates the available raw sections into one structured model input.
fn prepare_input(raw: &RawDataBag) -> String {
    let mut sections = Vec::new();

    sections.push(format!("## TARGET COMPANY:\n{}", raw.company_name));

    if let Some(website) = &raw.website {
        if let Ok(json) = serde_json::to_string_pretty(website) {
            sections.push(format!("## WEBSITE DATA:\n{}", json));
        }
    }
    if let Some(company) = &raw.linkedin_company {
        if let Ok(json) = serde_json::to_string_pretty(company) {
            sections.push(format!("## LINKEDIN COMPANY DATA:\n{}", json));
        }
    }
    if let Some(enrichment) = &raw.enrichment {
        if let Ok(json) = serde_json::to_string_pretty(enrichment) {
            sections.push(format!("## ENRICHMENT API DATA:\n{}", json));
        }
    }
    if !raw.individual_profiles.is_empty() {
        if let Ok(json) = serde_json::to_string_pretty(&raw.individual_profiles) {
            sections.push(format!("## INDIVIDUAL LINKEDIN PROFILES:\n{}", json));
        }
    }

    sections.join("\n\n")
}

fn build_transformation_prompt(input: &str) -> String {
    format!(
        r#"CRITICAL DATA TRANSFORMATION TASK:

Transform the following raw, heterogeneous data into a precise, structured JSON format suitable for database storage and AI email generation.

INPUT DATA:
{input}

OUTPUT REQUIREMENTS:
1. Produce a single JSON object with the exact schema below
2. Clean and normalize all data fields
3. Extract meaningful insights and summaries
4. Handle missing data gracefully with null values — never fabricate
5. Ensure all URLs are properly formatted
6. Synthesize professional summaries from multiple data sources

REQUIRED JSON SCHEMA:
{{
    "company": {{
        "name": "string",
        "website_url": "string",
        "linkedin_url": "string or null",
        "industry": "string",
        "revenue_range": "string or null",
        "employee_count_range": "string or null",
        "technologies_used": ["array of strings"],
        "mission_vision_offerings_summary": "string (200-300 words)",
        "recent_company_activity_summary": "string (100-200 words)",
        "contact_form_url": "string or null",
        "description": "string or null",
        "founded_year": "number or null",
        "headquarters": "string or null"
    }},
    "contacts": [
        {{
            "name": "string",
            "title": "string or null",
            "email_primary": "string",
            "email_other_business": ["array of strings"],
            "email_personal_staff": ["array of strings"],
            "email_executive": ["array of strings"],
            "phone_numbers": ["array of strings"],
            "social_profiles": {{
                "linkedin": "string or null",
                "twitter": "string or null",
                "youtube": "string or null",
                "tiktok": "string or null",
                "instagram": "string or null",
                "facebook": "string or null",
                "other_social_media_handles": ["array of strings"]
            }},
            "scraped_linkedin_profile_summary": "string (100-150 words) or null",
            "scraped_linkedin_recent_activity": ["array of strings"],
            "scraped_accomplishments_summary": "string or null",
            "scraped_past_work_summary": "string or null",
            "scraped_current_work_summary": "string or null",
            "scraped_online_contributions_summary": "string or null",
            "seniority_level": "string or null",
            "departments": ["array of strings"]
        }}
    ],
    "campaign_status": "string",
    "data_quality_score": 0,
    "enrichment_timestamp": null
}}

IMPORTANT INSTRUCTIONS:
- Use the enrichment API data as the primary source for contact information
- Enhance contact profiles with the scraped LinkedIn narrative
- Create comprehensive summaries that combine multiple data sources
- Ensure all email addresses are properly formatted
- Set campaign_status to "Data Ready" if all required fields are populated

RESPOND WITH ONLY THE JSON OBJECT - NO ADDITIONAL TEXT OR FORMATTING."#
    )
}

fn parse_and_validate(response: &str) -> Result<CanonicalRecord, TransformError> {
    let cleaned = strip_code_fences(response);

    let value: Value = serde_json::from_str(cleaned).map_err(|e| {
        error!("Model response was not valid JSON: {}", e);
        TransformError::InvalidJson {
            message: e.to_string(),
            raw: response.to_string(),
        }
    })?;

    validate_structure(&value)?;

    serde_json::from_value(value).map_err(|e| TransformError::InvalidJson {
        message: e.to_string(),
        raw: response.to_string(),
    })
}

fn non_empty_string(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_str)
        .map(|s| !s.trim().is_empty())
        .unwrap_or(false)
}

/// Structural checks on the decoded JSON, before typed deserialization. A
/// record that fails any of these is rejected, never returned.
fn validate_structure(value: &Value) -> Result<(), TransformError> {
    let company = value
        .get("company")
        .filter(|c| c.is_object())
        .ok_or_else(|| TransformError::Validation("missing required field: company".into()))?;

    for field in ["name", "website_url", "industry"] {
        if !non_empty_string(company.get(field)) {
            return Err(TransformError::Validation(format!(
                "missing required company field: {}",
                field
            )));
        }
    }

    let contacts = value
        .get("contacts")
        .and_then(Value::as_array)
        .ok_or_else(|| TransformError::Validation("missing required field: contacts".into()))?;

    if contacts.is_empty() {
        return Err(TransformError::Validation("contacts list cannot be empty".into()));
    }

    for contact in contacts {
        if !contact.is_object() {
            return Err(TransformError::Validation("each contact must be an object".into()));
        }
        for field in ["name", "email_primary"] {
            if !non_empty_string(contact.get(field)) {
                return Err(TransformError::Validation(format!(
                    "missing required contact field: {}",
                    field
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::linkedin::types::RawLinkedInProfile;
    use crate::models::ProfileCapture;
    use async_trait::async_trait;

    struct FakeLlm {
        response: String,
    }

    #[async_trait]
    impl CompletionClient for FakeLlm {
        async fn complete(&self, _: &str, _: f32, _: u32) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    fn engine(response: &str) -> NormalizationEngine {
        NormalizationEngine::new(
            Arc::new(FakeLlm {
                response: response.to_string(),
            }),
            0.2,
            8192,
        )
    }

    fn valid_response() -> String {
        serde_json::json!({
            "company": {
                "name": "Acme Incorporated",
                "website_url": "https://acme.com",
                "industry": "Aerospace manufacturing"
            },
            "contacts": [
                {
                    "name": "Jo Example",
                    "email_primary": "jo@acme.com"
                }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", valid_response());
        let record = engine(&fenced)
            .transform(&RawDataBag::new("Acme", None, None))
            .await
            .unwrap();
        assert_eq!(record.company.name, "Acme Incorporated");
        assert_eq!(record.contacts.len(), 1);
    }

    #[tokio::test]
    async fn invalid_json_keeps_raw_response() {
        let err = engine("the model rambled instead of answering")
            .transform(&RawDataBag::new("Acme", None, None))
            .await
            .unwrap_err();
        match err {
            TransformError::InvalidJson { raw, .. } => {
                assert!(raw.contains("rambled"));
            }
            other => panic!("expected InvalidJson, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_company_is_rejected() {
        let response = serde_json::json!({"contacts": [{"name": "Jo", "email_primary": "jo@a.com"}]});
        let err = engine(&response.to_string())
            .transform(&RawDataBag::new("Acme", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Validation(_)));
    }

    #[tokio::test]
    async fn empty_contacts_are_rejected() {
        let response = serde_json::json!({
            "company": {"name": "Acme Incorporated", "website_url": "https://acme.com", "industry": "Aerospace"},
            "contacts": []
        });
        let err = engine(&response.to_string())
            .transform(&RawDataBag::new("Acme", None, None))
            .await
            .unwrap_err();
        match err {
            TransformError::Validation(message) => assert!(message.contains("empty")),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn contact_without_email_is_rejected() {
        let response = serde_json::json!({
            "company": {"name": "Acme Incorporated", "website_url": "https://acme.com", "industry": "Aerospace"},
            "contacts": [{"name": "Jo Example"}]
        });
        let err = engine(&response.to_string())
            .transform(&RawDataBag::new("Acme", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::Validation(_)));
    }

    #[tokio::test]
    async fn campaign_status_defaults_and_score_is_local() {
        let response = serde_json::json!({
            "company": {"name": "Acme Incorporated", "website_url": "https://acme.com", "industry": "Aerospace"},
            "contacts": [{"name": "Jo Example", "email_primary": "jo@acme.com"}],
            // The model's opinion of its own quality must be discarded.
            "data_quality_score": 100
        });
        let record = engine(&response.to_string())
            .transform(&RawDataBag::new("Acme", None, None))
            .await
            .unwrap();
        assert_eq!(record.campaign_status.as_deref(), Some("Data Ready"));
        assert!(record.enrichment_timestamp.is_some());
        let score = record.data_quality_score.unwrap();
        assert!(score < 100, "sparse record must not keep the model's score");
    }

    #[tokio::test]
    async fn sparse_profile_input_does_not_break_the_prompt() {
        // A profile with every optional field absent must serialize into the
        // prompt and transform cleanly.
        let mut bag = RawDataBag::new("Acme", Some("https://acme.com"), None);
        bag.individual_profiles.push(ProfileCapture {
            source_url: "https://linkedin.com/in/jo".to_string(),
            profile: RawLinkedInProfile::default(),
        });

        let record = engine(&valid_response()).transform(&bag).await.unwrap();
        assert_eq!(record.contacts.len(), 1);
    }

    #[test]
    fn fence_stripping_handles_tagged_and_plain() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
