// src/normalizer/schema.rs
use serde::{Deserialize, Serialize};

/// Fixed platform set plus a catch-all, as stored on canonical contacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfiles {
    pub linkedin: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub tiktok: Option<String>,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    #[serde(default)]
    pub other_social_media_handles: Vec<String>,
}

impl SocialProfiles {
    pub fn is_empty(&self) -> bool {
        self.linkedin.is_none()
            && self.twitter.is_none()
            && self.youtube.is_none()
            && self.tiktok.is_none()
            && self.instagram.is_none()
            && self.facebook.is_none()
            && self.other_social_media_handles.is_empty()
    }
}

/// Company block of the canonical record. `name`, `website_url` and
/// `industry` are guaranteed non-empty by validation; everything else is
/// nullable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalCompany {
    pub name: String,
    pub website_url: String,
    pub industry: String,
    pub linkedin_url: Option<String>,
    pub revenue_range: Option<String>,
    pub employee_count_range: Option<String>,
    #[serde(default)]
    pub technologies_used: Vec<String>,
    pub mission_vision_offerings_summary: Option<String>,
    pub recent_company_activity_summary: Option<String>,
    pub contact_form_url: Option<String>,
    pub description: Option<String>,
    pub founded_year: Option<i64>,
    pub headquarters: Option<String>,
    pub enrichment_org_id: Option<String>,
}

/// Contact entry of the canonical record. `name` and `email_primary` are
/// guaranteed non-empty by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalContact {
    pub contact_id: Option<String>,
    pub name: String,
    pub title: Option<String>,
    pub email_primary: String,
    #[serde(default)]
    pub email_other_business: Vec<String>,
    #[serde(default)]
    pub email_personal_staff: Vec<String>,
    #[serde(default)]
    pub email_executive: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    #[serde(default)]
    pub social_profiles: SocialProfiles,
    pub scraped_linkedin_profile_summary: Option<String>,
    #[serde(default)]
    pub scraped_linkedin_recent_activity: Vec<String>,
    pub scraped_accomplishments_summary: Option<String>,
    pub scraped_past_work_summary: Option<String>,
    pub scraped_current_work_summary: Option<String>,
    pub scraped_online_contributions_summary: Option<String>,
    pub seniority_level: Option<String>,
    #[serde(default)]
    pub departments: Vec<String>,
    pub enrichment_contact_id: Option<String>,
}

/// The normalized, schema-validated record produced by the transformation
/// step. This is the wire contract between normalization and storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: Option<String>,
    pub company: CanonicalCompany,
    #[serde(default)]
    pub contacts: Vec<CanonicalContact>,
    pub campaign_status: Option<String>,
    /// Always recomputed locally; any model-provided value is discarded.
    pub data_quality_score: Option<i64>,
    pub enrichment_timestamp: Option<i64>,
}
