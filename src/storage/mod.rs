// src/storage/mod.rs
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::{EmailDraft, EmailLogEntry, ProspectStatus};
use crate::normalizer::schema::SocialProfiles;

pub use memory::MemoryStore;
pub use sqlite::{create_db_pool, SqliteStore};

/// Prospect-level company row. One per imported company; mutated
/// incrementally by every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCompany {
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub industry: Option<String>,
    pub revenue_range: Option<String>,
    pub employee_count_range: Option<String>,
    pub technologies_used: Vec<String>,
    pub mission_summary: Option<String>,
    pub recent_activity_summary: Option<String>,
    pub contact_form_url: Option<String>,
    pub description: Option<String>,
    pub founded_year: Option<i64>,
    pub headquarters: Option<String>,
    pub enrichment_org_id: Option<String>,
    pub website_text_snippet: Option<String>,
    pub status: ProspectStatus,
    pub campaign_status: String,
    pub data_quality_score: Option<i64>,
    pub enrichment_timestamp: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredCompany {
    pub fn new(id: &str, user_id: &str, company_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            company_name: company_name.to_string(),
            website_url: None,
            linkedin_url: None,
            industry: None,
            revenue_range: None,
            employee_count_range: None,
            technologies_used: Vec::new(),
            mission_summary: None,
            recent_activity_summary: None,
            contact_form_url: None,
            description: None,
            founded_year: None,
            headquarters: None,
            enrichment_org_id: None,
            website_text_snippet: None,
            status: ProspectStatus::Processing,
            campaign_status: "Processing".to_string(),
            data_quality_score: None,
            enrichment_timestamp: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &CompanyPatch) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(value) = &patch.$field {
                    self.$field = Some(value.clone());
                }
            };
        }
        if let Some(name) = &patch.company_name {
            self.company_name = name.clone();
        }
        set!(website_url);
        set!(linkedin_url);
        set!(industry);
        set!(revenue_range);
        set!(employee_count_range);
        set!(mission_summary);
        set!(recent_activity_summary);
        set!(contact_form_url);
        set!(description);
        set!(headquarters);
        set!(enrichment_org_id);
        set!(website_text_snippet);
        if let Some(technologies) = &patch.technologies_used {
            self.technologies_used = technologies.clone();
        }
        if let Some(year) = patch.founded_year {
            self.founded_year = Some(year);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(campaign_status) = &patch.campaign_status {
            self.campaign_status = campaign_status.clone();
        }
        if let Some(score) = patch.data_quality_score {
            self.data_quality_score = Some(score);
        }
        if let Some(ts) = patch.enrichment_timestamp {
            self.enrichment_timestamp = Some(ts);
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update for a company row; only the provided fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyPatch {
    pub company_name: Option<String>,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub industry: Option<String>,
    pub revenue_range: Option<String>,
    pub employee_count_range: Option<String>,
    pub technologies_used: Option<Vec<String>>,
    pub mission_summary: Option<String>,
    pub recent_activity_summary: Option<String>,
    pub contact_form_url: Option<String>,
    pub description: Option<String>,
    pub founded_year: Option<i64>,
    pub headquarters: Option<String>,
    pub enrichment_org_id: Option<String>,
    pub website_text_snippet: Option<String>,
    pub status: Option<ProspectStatus>,
    pub campaign_status: Option<String>,
    pub data_quality_score: Option<i64>,
    pub enrichment_timestamp: Option<i64>,
}

/// Contact row. Owned by exactly one prospect; referenced by email drafts and
/// logs via its id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredContact {
    pub id: String,
    pub company_id: String,
    pub user_id: String,
    pub enrichment_contact_id: Option<String>,
    pub name: String,
    pub title: Option<String>,
    pub email_primary: Option<String>,
    pub email_other_business: Vec<String>,
    pub email_personal_staff: Vec<String>,
    pub email_executive: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub social_profiles: Option<SocialProfiles>,
    pub linkedin_profile_url: Option<String>,
    pub profile_summary: Option<String>,
    pub recent_activity: Vec<String>,
    pub accomplishments_summary: Option<String>,
    pub past_work_summary: Option<String>,
    pub current_work_summary: Option<String>,
    pub online_contributions_summary: Option<String>,
    pub seniority_level: Option<String>,
    pub departments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredContact {
    pub fn new(id: &str, company_id: &str, user_id: &str, name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            company_id: company_id.to_string(),
            user_id: user_id.to_string(),
            enrichment_contact_id: None,
            name: name.to_string(),
            title: None,
            email_primary: None,
            email_other_business: Vec::new(),
            email_personal_staff: Vec::new(),
            email_executive: Vec::new(),
            phone_numbers: Vec::new(),
            social_profiles: None,
            linkedin_profile_url: None,
            profile_summary: None,
            recent_activity: Vec::new(),
            accomplishments_summary: None,
            past_work_summary: None,
            current_work_summary: None,
            online_contributions_summary: None,
            seniority_level: None,
            departments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: &ContactPatch) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(value) = &patch.$field {
                    self.$field = Some(value.clone());
                }
            };
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        set!(title);
        set!(email_primary);
        set!(linkedin_profile_url);
        set!(profile_summary);
        set!(accomplishments_summary);
        set!(past_work_summary);
        set!(current_work_summary);
        set!(online_contributions_summary);
        set!(seniority_level);
        set!(enrichment_contact_id);
        if let Some(value) = &patch.email_other_business {
            self.email_other_business = value.clone();
        }
        if let Some(value) = &patch.email_personal_staff {
            self.email_personal_staff = value.clone();
        }
        if let Some(value) = &patch.email_executive {
            self.email_executive = value.clone();
        }
        if let Some(value) = &patch.phone_numbers {
            self.phone_numbers = value.clone();
        }
        if let Some(value) = &patch.recent_activity {
            self.recent_activity = value.clone();
        }
        if let Some(value) = &patch.departments {
            self.departments = value.clone();
        }
        if let Some(value) = &patch.social_profiles {
            self.social_profiles = Some(value.clone());
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email_primary: Option<String>,
    pub email_other_business: Option<Vec<String>>,
    pub email_personal_staff: Option<Vec<String>>,
    pub email_executive: Option<Vec<String>>,
    pub phone_numbers: Option<Vec<String>>,
    pub social_profiles: Option<SocialProfiles>,
    pub linkedin_profile_url: Option<String>,
    pub profile_summary: Option<String>,
    pub recent_activity: Option<Vec<String>>,
    pub accomplishments_summary: Option<String>,
    pub past_work_summary: Option<String>,
    pub current_work_summary: Option<String>,
    pub online_contributions_summary: Option<String>,
    pub seniority_level: Option<String>,
    pub departments: Option<Vec<String>>,
    pub enrichment_contact_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCampaign {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignProspect {
    pub campaign_id: String,
    pub prospect_id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Storage collaborator. All operations are idempotent-by-id upserts from the
/// pipeline's perspective; the pipeline never relies on multi-row
/// transactional guarantees.
#[async_trait]
pub trait ProspectStore: Send + Sync {
    async fn insert_company(&self, company: &StoredCompany) -> Result<(), StorageError>;
    async fn update_company(&self, id: &str, patch: &CompanyPatch) -> Result<(), StorageError>;
    async fn get_company(&self, id: &str) -> Result<Option<StoredCompany>, StorageError>;

    async fn insert_contact(&self, contact: &StoredContact) -> Result<(), StorageError>;
    async fn update_contact(&self, id: &str, patch: &ContactPatch) -> Result<(), StorageError>;
    async fn get_contact(&self, id: &str) -> Result<Option<StoredContact>, StorageError>;
    async fn get_contacts_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<StoredContact>, StorageError>;

    async fn insert_email_log(&self, entry: &EmailLogEntry) -> Result<(), StorageError>;

    /// One draft per (prospect, company) and one per (prospect, contact);
    /// regeneration overwrites.
    async fn upsert_email_draft(
        &self,
        prospect_id: &str,
        contact_id: Option<&str>,
        draft: &EmailDraft,
    ) -> Result<(), StorageError>;
    async fn get_email_draft(
        &self,
        prospect_id: &str,
        contact_id: Option<&str>,
    ) -> Result<Option<EmailDraft>, StorageError>;

    async fn insert_campaign(&self, campaign: &StoredCampaign) -> Result<(), StorageError>;
    async fn update_campaign(&self, id: &str, status: &str) -> Result<(), StorageError>;
    async fn get_campaign(&self, id: &str) -> Result<Option<StoredCampaign>, StorageError>;
    async fn get_campaign_prospects(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<CampaignProspect>, StorageError>;
    async fn update_campaign_prospect(
        &self,
        campaign_id: &str,
        prospect_id: &str,
        status: &str,
    ) -> Result<(), StorageError>;

    async fn get_user(&self, id: &str) -> Result<Option<StoredUser>, StorageError>;
    async fn insert_user(&self, user: &StoredUser) -> Result<(), StorageError>;
}
