// src/outreach/generator.rs
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::error::GenerateError;
use crate::llm::{strip_code_fences, CompletionClient};
use crate::models::EmailDraft;
use crate::storage::{StoredCompany, StoredContact};

/// Who the outreach is from; interpolated into every draft prompt.
#[derive(Debug, Clone)]
pub struct SenderInfo {
    pub name: String,
    pub company: String,
    pub role: String,
    pub offering: String,
}

#[derive(Deserialize)]
struct DraftResponse {
    subject: String,
    body: String,
    #[serde(default)]
    personalization_elements: Vec<String>,
}

/// LLM-backed generator for hyper-personalized outreach drafts: one
/// company-level draft per prospect and one individual draft per contact.
pub struct EmailGenerator {
    llm: Arc<dyn CompletionClient>,
    temperature: f32,
    max_tokens: u32,
}

impl EmailGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            llm,
            temperature,
            max_tokens,
        }
    }

    pub async fn generate_company_email(
        &self,
        company: &StoredCompany,
        sender: &SenderInfo,
    ) -> Result<EmailDraft, GenerateError> {
        info!("Generating company outreach email for: {}", company.company_name);
        let prompt = company_prompt(company, sender);
        let response = self
            .llm
            .complete(&prompt, self.temperature, self.max_tokens)
            .await?;
        parse_draft(&response)
    }

    pub async fn generate_individual_email(
        &self,
        contact: &StoredContact,
        company: &StoredCompany,
        sender: &SenderInfo,
    ) -> Result<EmailDraft, GenerateError> {
        info!("Generating individual outreach email for: {}", contact.name);
        let prompt = individual_prompt(contact, company, sender);
        let response = self
            .llm
            .complete(&prompt, self.temperature, self.max_tokens)
            .await?;
        parse_draft(&response)
    }
}

fn parse_draft(response: &str) -> Result<EmailDraft, GenerateError> {
    let cleaned = strip_code_fences(response);
    let draft: DraftResponse = serde_json::from_str(cleaned)
        .map_err(|e| GenerateError::InvalidDraft(format!("{}: {}", e, cleaned)))?;

    if draft.subject.trim().is_empty() || draft.body.trim().is_empty() {
        return Err(GenerateError::InvalidDraft(
            "draft subject or body was empty".to_string(),
        ));
    }

    Ok(EmailDraft {
        subject: draft.subject,
        body: draft.body,
        personalization_elements: draft.personalization_elements,
    })
}

fn company_prompt(company: &StoredCompany, sender: &SenderInfo) -> String {
    format!(
        r#"Generate a highly personalized, professional email for initial company outreach.

COMPANY INFORMATION:
- Name: {name}
- Industry: {industry}
- Website: {website}
- Mission/Vision: {mission}
- Recent Activity: {activity}
- Technologies: {technologies}

SENDER INFORMATION:
- Name: {sender_name}
- Company: {sender_company}
- Role: {sender_role}
- Offering: {offering}

EMAIL REQUIREMENTS:
1. Subject line: compelling, personalized, under 60 characters
2. Body: 150-200 words, professional tone, value-focused
3. Include a specific reference to their mission or offerings
4. Mention relevant recent activity or technologies if available
5. Clear value proposition and a professional call-to-action

TONE: Professional, respectful, value-oriented, not salesy
GOAL: Schedule a brief conversation to discuss potential collaboration

RESPOND IN JSON FORMAT:
{{
    "subject": "email subject line",
    "body": "email body text",
    "personalization_elements": ["what was personalized and why"]
}}"#,
        name = company.company_name,
        industry = company.industry.as_deref().unwrap_or(""),
        website = company.website_url.as_deref().unwrap_or(""),
        mission = company.mission_summary.as_deref().unwrap_or(""),
        activity = company.recent_activity_summary.as_deref().unwrap_or(""),
        technologies = company.technologies_used.join(", "),
        sender_name = sender.name,
        sender_company = sender.company,
        sender_role = sender.role,
        offering = sender.offering,
    )
}

fn individual_prompt(contact: &StoredContact, company: &StoredCompany, sender: &SenderInfo) -> String {
    let first_name = contact.name.split_whitespace().next().unwrap_or("");
    let activity = contact
        .recent_activity
        .iter()
        .map(|a| format!("- {}", a))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Generate a highly personalized email for individual outreach based on LinkedIn activity and professional background.

CONTACT INFORMATION:
- Name: {name}
- First Name: {first_name}
- Title: {title}
- Company: {company_name}
- LinkedIn Summary: {summary}

RECENT ACTIVITY:
{activity}

PROFESSIONAL BACKGROUND:
- Accomplishments: {accomplishments}
- Current Work: {current_work}
- Past Work: {past_work}
- Online Contributions: {contributions}

SENDER INFORMATION:
- Name: {sender_name}
- Company: {sender_company}
- Role: {sender_role}
- Offering: {offering}

EMAIL REQUIREMENTS:
1. Subject line: highly personalized, referencing a specific activity or accomplishment
2. Body: 120-180 words, conversational yet professional
3. Reference specific recent LinkedIn activity or accomplishments
4. Show genuine interest in their work; soft call-to-action for a brief conversation

TONE: Conversational, respectful, colleague-to-colleague, genuine interest
GOAL: Build relationship and explore mutual professional interests

RESPOND IN JSON FORMAT:
{{
    "subject": "email subject line",
    "body": "email body text",
    "personalization_elements": ["what was personalized and why"]
}}"#,
        name = contact.name,
        first_name = first_name,
        title = contact.title.as_deref().unwrap_or(""),
        company_name = company.company_name,
        summary = contact.profile_summary.as_deref().unwrap_or(""),
        activity = activity,
        accomplishments = contact.accomplishments_summary.as_deref().unwrap_or(""),
        current_work = contact.current_work_summary.as_deref().unwrap_or(""),
        past_work = contact.past_work_summary.as_deref().unwrap_or(""),
        contributions = contact.online_contributions_summary.as_deref().unwrap_or(""),
        sender_name = sender.name,
        sender_company = sender.company,
        sender_role = sender.role,
        offering = sender.offering,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
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

    fn generator(response: &str) -> EmailGenerator {
        EmailGenerator::new(
            Arc::new(FakeLlm {
                response: response.to_string(),
            }),
            0.7,
            1000,
        )
    }

    fn sender_info() -> SenderInfo {
        SenderInfo {
            name: "Sam Seller".to_string(),
            company: "Vendor Co".to_string(),
            role: "Account Executive".to_string(),
            offering: "automation tooling".to_string(),
        }
    }

    #[tokio::test]
    async fn parses_fenced_draft_json() {
        let response = "```json\n{\"subject\": \"Rockets and React\", \
                        \"body\": \"Hello there, impressive launch cadence.\", \
                        \"personalization_elements\": [\"mentioned launch cadence\"]}\n```";
        let company = StoredCompany::new("p1", "u1", "Acme Inc");
        let draft = generator(response)
            .generate_company_email(&company, &sender_info())
            .await
            .unwrap();
        assert_eq!(draft.subject, "Rockets and React");
        assert_eq!(draft.personalization_elements.len(), 1);
    }

    #[tokio::test]
    async fn non_json_draft_is_a_typed_error() {
        let company = StoredCompany::new("p1", "u1", "Acme Inc");
        let err = generator("Subject: hi\n\nplain text body")
            .generate_company_email(&company, &sender_info())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidDraft(_)));
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let company = StoredCompany::new("p1", "u1", "Acme Inc");
        let err = generator("{\"subject\": \"\", \"body\": \"text\"}")
            .generate_company_email(&company, &sender_info())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidDraft(_)));
    }

    #[test]
    fn individual_prompt_carries_contact_narrative() {
        let company = StoredCompany::new("p1", "u1", "Acme Inc");
        let mut contact = StoredContact::new("c1", "p1", "u1", "Jo Example");
        contact.recent_activity = vec!["Posted about propulsion".to_string()];
        contact.current_work_summary = Some("CTO at Acme".to_string());

        let prompt = individual_prompt(&contact, &company, &sender_info());
        assert!(prompt.contains("- Posted about propulsion"));
        assert!(prompt.contains("CTO at Acme"));
        assert!(prompt.contains("First Name: Jo"));
    }
}
