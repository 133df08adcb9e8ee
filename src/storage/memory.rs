// src/storage/memory.rs
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::models::{EmailDraft, EmailLogEntry};
use crate::storage::{
    CampaignProspect, CompanyPatch, ContactPatch, ProspectStore, StoredCampaign, StoredCompany,
    StoredContact, StoredUser,
};

/// In-memory storage double. Used by tests and as a fallback when no database
/// path is configured; semantics match `SqliteStore`.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    companies: HashMap<String, StoredCompany>,
    // Insertion order matters for get_contacts_by_company.
    contacts: Vec<StoredContact>,
    email_logs: Vec<EmailLogEntry>,
    email_drafts: HashMap<(String, Option<String>), EmailDraft>,
    campaigns: HashMap<String, StoredCampaign>,
    campaign_prospects: Vec<CampaignProspect>,
    users: HashMap<String, StoredUser>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test-only introspection of the append-only send log.
    pub fn email_logs(&self) -> Vec<EmailLogEntry> {
        self.inner.lock().unwrap().email_logs.clone()
    }
}

#[async_trait]
impl ProspectStore for MemoryStore {
    async fn insert_company(&self, company: &StoredCompany) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.companies.insert(company.id.clone(), company.clone());
        Ok(())
    }

    async fn update_company(&self, id: &str, patch: &CompanyPatch) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.companies.get_mut(id) {
            Some(company) => {
                company.apply(patch);
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("company {}", id))),
        }
    }

    async fn get_company(&self, id: &str) -> Result<Option<StoredCompany>, StorageError> {
        Ok(self.inner.lock().unwrap().companies.get(id).cloned())
    }

    async fn insert_contact(&self, contact: &StoredContact) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.contacts.iter_mut().find(|c| c.id == contact.id) {
            *existing = contact.clone();
        } else {
            inner.contacts.push(contact.clone());
        }
        Ok(())
    }

    async fn update_contact(&self, id: &str, patch: &ContactPatch) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.contacts.iter_mut().find(|c| c.id == id) {
            Some(contact) => {
                contact.apply(patch);
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("contact {}", id))),
        }
    }

    async fn get_contact(&self, id: &str) -> Result<Option<StoredContact>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .contacts
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn get_contacts_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<StoredContact>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .contacts
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn insert_email_log(&self, entry: &EmailLogEntry) -> Result<(), StorageError> {
        self.inner.lock().unwrap().email_logs.push(entry.clone());
        Ok(())
    }

    async fn upsert_email_draft(
        &self,
        prospect_id: &str,
        contact_id: Option<&str>,
        draft: &EmailDraft,
    ) -> Result<(), StorageError> {
        let key = (prospect_id.to_string(), contact_id.map(|s| s.to_string()));
        self.inner.lock().unwrap().email_drafts.insert(key, draft.clone());
        Ok(())
    }

    async fn get_email_draft(
        &self,
        prospect_id: &str,
        contact_id: Option<&str>,
    ) -> Result<Option<EmailDraft>, StorageError> {
        let key = (prospect_id.to_string(), contact_id.map(|s| s.to_string()));
        Ok(self.inner.lock().unwrap().email_drafts.get(&key).cloned())
    }

    async fn insert_campaign(&self, campaign: &StoredCampaign) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.campaigns.insert(campaign.id.clone(), campaign.clone());
        Ok(())
    }

    async fn update_campaign(&self, id: &str, status: &str) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.campaigns.get_mut(id) {
            Some(campaign) => {
                campaign.status = status.to_string();
                campaign.updated_at = chrono::Utc::now();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("campaign {}", id))),
        }
    }

    async fn get_campaign(&self, id: &str) -> Result<Option<StoredCampaign>, StorageError> {
        Ok(self.inner.lock().unwrap().campaigns.get(id).cloned())
    }

    async fn get_campaign_prospects(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<CampaignProspect>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .campaign_prospects
            .iter()
            .filter(|cp| cp.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn update_campaign_prospect(
        &self,
        campaign_id: &str,
        prospect_id: &str,
        status: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .campaign_prospects
            .iter_mut()
            .find(|cp| cp.campaign_id == campaign_id && cp.prospect_id == prospect_id)
        {
            existing.status = status.to_string();
            existing.updated_at = chrono::Utc::now();
        } else {
            inner.campaign_prospects.push(CampaignProspect {
                campaign_id: campaign_id.to_string(),
                prospect_id: prospect_id.to_string(),
                status: status.to_string(),
                updated_at: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<StoredUser>, StorageError> {
        Ok(self.inner.lock().unwrap().users.get(id).cloned())
    }

    async fn insert_user(&self, user: &StoredUser) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().unwrap();
        inner.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}
