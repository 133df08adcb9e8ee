// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crawler::RawWebsiteData;
use crate::enrichment::RawEnrichment;
use crate::linkedin::{RawLinkedInCompany, RawLinkedInProfile};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Lifecycle of a prospect. `Ready`, `PartialData`, `Error`, `Contacted` and
/// `Replied` are terminal; prospects are never deleted automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProspectStatus {
    Processing,
    Ready,
    PartialData,
    Contacted,
    Replied,
    Error,
}

impl ProspectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProspectStatus::Processing => "processing",
            ProspectStatus::Ready => "ready",
            ProspectStatus::PartialData => "partial_data",
            ProspectStatus::Contacted => "contacted",
            ProspectStatus::Replied => "replied",
            ProspectStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(ProspectStatus::Processing),
            "ready" => Some(ProspectStatus::Ready),
            "partial_data" => Some(ProspectStatus::PartialData),
            "contacted" => Some(ProspectStatus::Contacted),
            "replied" => Some(ProspectStatus::Replied),
            "error" => Some(ProspectStatus::Error),
            _ => None,
        }
    }
}

/// One individual LinkedIn profile capture, keyed by the URL it came from so
/// normalization can match it back to the enrichment contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCapture {
    pub source_url: String,
    pub profile: RawLinkedInProfile,
}

/// Ephemeral per-run container of everything the stages collected for one
/// prospect. Consumed by the normalization engine and discarded; never
/// persisted as-is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawDataBag {
    pub company_name: String,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub website: Option<RawWebsiteData>,
    pub linkedin_company: Option<RawLinkedInCompany>,
    pub enrichment: Option<RawEnrichment>,
    pub individual_profiles: Vec<ProfileCapture>,
}

impl RawDataBag {
    pub fn new(company_name: &str, website_url: Option<&str>, linkedin_url: Option<&str>) -> Self {
        Self {
            company_name: company_name.to_string(),
            website_url: website_url.map(|s| s.to_string()),
            linkedin_url: linkedin_url.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    /// True when no acquisition stage contributed anything.
    pub fn is_empty(&self) -> bool {
        self.website.is_none()
            && self.linkedin_company.is_none()
            && self.enrichment.is_none()
            && self.individual_profiles.is_empty()
    }
}

/// A pipeline stage, for failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Crawl,
    Enrich,
    ProfileScrape,
    Normalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Crawl => "crawl",
            Stage::Enrich => "enrich",
            Stage::ProfileScrape => "profile_scrape",
            Stage::Normalize => "normalize",
        }
    }
}

/// A non-fatal stage failure recorded on the prospect outcome. The pipeline
/// continues to the next stage after recording one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// Result of running the full pipeline for one prospect.
#[derive(Debug, Clone, Serialize)]
pub struct ProspectOutcome {
    pub prospect_id: String,
    pub company_name: String,
    pub status: ProspectStatus,
    pub data_quality_score: Option<i64>,
    pub contact_count: usize,
    pub stage_failures: Vec<StageFailure>,
    pub error: Option<String>,
    pub processing_time_ms: u64,
}

/// One entry per CSV row, always, so callers can reconcile row count to
/// result count 1:1.
#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    pub line: usize,
    pub company_name: Option<String>,
    pub outcome: std::result::Result<ProspectOutcome, String>,
}

/// Supported outbound email providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmailProvider {
    Gmail,
    Outlook,
}

impl EmailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Gmail => "gmail",
            EmailProvider::Outlook => "outlook",
        }
    }

    pub fn parse(s: &str) -> std::result::Result<Self, crate::error::SendError> {
        match s.to_lowercase().as_str() {
            "gmail" => Ok(EmailProvider::Gmail),
            "outlook" => Ok(EmailProvider::Outlook),
            other => Err(crate::error::SendError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// A generated outreach draft. One per (prospect, company) and one per
/// (prospect, contact); regeneration overwrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub personalization_elements: Vec<String>,
}

/// Append-only record of a send attempt. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub id: String,
    pub prospect_id: String,
    pub contact_id: Option<String>,
    pub email_type: String,
    pub recipient: String,
    pub status: String,
    pub provider: String,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            ProspectStatus::Processing,
            ProspectStatus::Ready,
            ProspectStatus::PartialData,
            ProspectStatus::Contacted,
            ProspectStatus::Replied,
            ProspectStatus::Error,
        ] {
            assert_eq!(ProspectStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ProspectStatus::parse("bogus"), None);
    }

    #[test]
    fn provider_parse_rejects_unknown() {
        assert_eq!(EmailProvider::parse("Gmail").unwrap(), EmailProvider::Gmail);
        assert_eq!(EmailProvider::parse("OUTLOOK").unwrap(), EmailProvider::Outlook);
        assert!(EmailProvider::parse("sendgrid").is_err());
    }

    #[test]
    fn empty_bag_reports_empty() {
        let bag = RawDataBag::new("Acme Inc", Some("https://acme.com"), None);
        assert!(bag.is_empty());
    }
}
