// src/pipeline/mod.rs
pub mod csv_import;

use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::crawler::WebsiteCrawler;
use crate::enrichment::{clean_domain, ContactRecord, EnrichmentClient};
use crate::error::EnrichmentError;
use crate::linkedin::ProfileSource;
use crate::models::{
    ProfileCapture, ProspectOutcome, ProspectStatus, RawDataBag, RowOutcome, Stage, StageFailure,
};
use crate::normalizer::schema::CanonicalRecord;
use crate::normalizer::NormalizationEngine;
use crate::pipeline::csv_import::parse_csv;
use crate::storage::{CompanyPatch, ContactPatch, ProspectStore, StoredCompany, StoredContact};

/// The profile session is a shared mutable resource (one logged-in browser);
/// scrapes for concurrent prospects serialize on this lock.
pub type SharedProfileSource = Arc<Mutex<Box<dyn ProfileSource>>>;

/// Sequences the acquisition stages per prospect, tolerates partial failure
/// of any stage, persists intermediate state after every stage, and reports a
/// terminal status per prospect.
pub struct PipelineCoordinator {
    store: Arc<dyn ProspectStore>,
    config: PipelineConfig,
    crawler: Option<WebsiteCrawler>,
    enrichment: Option<EnrichmentClient>,
    profiles: Option<SharedProfileSource>,
    normalizer: Option<NormalizationEngine>,
}

impl PipelineCoordinator {
    pub fn new(store: Arc<dyn ProspectStore>, config: PipelineConfig) -> Self {
        Self {
            store,
            config,
            crawler: None,
            enrichment: None,
            profiles: None,
            normalizer: None,
        }
    }

    pub fn with_crawler(mut self, crawler: WebsiteCrawler) -> Self {
        self.crawler = Some(crawler);
        self
    }

    pub fn with_enrichment(mut self, enrichment: EnrichmentClient) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    pub fn with_profiles(mut self, profiles: SharedProfileSource) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_normalizer(mut self, normalizer: NormalizationEngine) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Runs the full stage sequence for one company, bounded by the
    /// per-prospect timeout. On cancellation the browser session is closed
    /// (the next scrape re-authenticates from cookies) and the prospect is
    /// marked `Error` with the cancellation reason instead of sticking in
    /// `Processing`.
    pub async fn process_company(
        &self,
        user_id: &str,
        company_name: &str,
        website_url: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> ProspectOutcome {
        let prospect_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let budget = Duration::from_secs(self.config.prospect_timeout_seconds);

        let run = self.run_stages(&prospect_id, user_id, company_name, website_url, linkedin_url);
        match tokio::time::timeout(budget, run).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let reason = format!(
                    "cancelled: prospect processing exceeded {}s",
                    self.config.prospect_timeout_seconds
                );
                warn!("{} for {}", reason, company_name);

                if let Some(profiles) = &self.profiles {
                    profiles.lock().await.close().await;
                }
                let _ = self
                    .store
                    .update_company(
                        &prospect_id,
                        &CompanyPatch {
                            status: Some(ProspectStatus::Error),
                            campaign_status: Some("Error".to_string()),
                            ..Default::default()
                        },
                    )
                    .await;

                ProspectOutcome {
                    prospect_id,
                    company_name: company_name.to_string(),
                    status: ProspectStatus::Error,
                    data_quality_score: None,
                    contact_count: 0,
                    stage_failures: Vec::new(),
                    error: Some(reason),
                    processing_time_ms: started.elapsed().as_millis() as u64,
                }
            }
        }
    }

    async fn run_stages(
        &self,
        prospect_id: &str,
        user_id: &str,
        company_name: &str,
        website_url: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> ProspectOutcome {
        let started = Instant::now();
        info!("Starting pipeline for company: {}", company_name);

        let mut company = StoredCompany::new(prospect_id, user_id, company_name);
        company.website_url = website_url.map(|s| s.to_string());
        company.linkedin_url = linkedin_url.map(|s| s.to_string());
        if let Err(e) = self.store.insert_company(&company).await {
            error!("Could not create prospect record: {}", e);
            return ProspectOutcome {
                prospect_id: prospect_id.to_string(),
                company_name: company_name.to_string(),
                status: ProspectStatus::Error,
                data_quality_score: None,
                contact_count: 0,
                stage_failures: Vec::new(),
                error: Some(e.to_string()),
                processing_time_ms: started.elapsed().as_millis() as u64,
            };
        }

        let mut bag = RawDataBag::new(company_name, website_url, linkedin_url);
        let mut stage_failures: Vec<StageFailure> = Vec::new();
        // Maps stored contact ids to the LinkedIn URL the profile stage
        // should scrape for them.
        let mut contact_targets: Vec<(String, String)> = Vec::new();

        self.stage_crawl(prospect_id, &mut bag, &mut stage_failures).await;
        self.stage_enrich(prospect_id, user_id, &mut bag, &mut stage_failures, &mut contact_targets)
            .await;
        self.stage_company_profile(&mut bag).await;
        self.stage_contact_profiles(&mut bag, &contact_targets).await;
        self.stage_normalize(prospect_id, user_id, bag, stage_failures, started)
            .await
    }

    async fn stage_crawl(
        &self,
        prospect_id: &str,
        bag: &mut RawDataBag,
        stage_failures: &mut Vec<StageFailure>,
    ) {
        let Some(crawler) = &self.crawler else {
            debug!("Crawler not configured, skipping stage");
            return;
        };
        let Some(website_url) = bag.website_url.clone() else {
            debug!("No website URL, skipping crawl stage");
            return;
        };

        let result = crawler.crawl(&website_url).await;
        if result.crawled_page_count == 0 {
            stage_failures.push(StageFailure {
                stage: Stage::Crawl,
                message: format!("no pages fetched from {}", website_url),
            });
        }

        let patch = CompanyPatch {
            website_text_snippet: Some(result.text_snippet.clone()),
            contact_form_url: result.contact_form_url.clone(),
            ..Default::default()
        };
        if let Err(e) = self.store.update_company(prospect_id, &patch).await {
            warn!("Could not persist crawl results: {}", e);
        }

        bag.website = Some(result);
    }

    async fn stage_enrich(
        &self,
        prospect_id: &str,
        user_id: &str,
        bag: &mut RawDataBag,
        stage_failures: &mut Vec<StageFailure>,
        contact_targets: &mut Vec<(String, String)>,
    ) {
        let Some(client) = &self.enrichment else {
            debug!("Enrichment client not configured, skipping stage");
            return;
        };

        let domain = bag.website_url.as_deref().map(clean_domain);
        let name = if domain.is_none() {
            Some(bag.company_name.clone())
        } else {
            None
        };

        let enrichment = match client
            .enrich_company_and_contacts(
                domain.as_deref(),
                name.as_deref(),
                self.config.max_contacts_per_company,
            )
            .await
        {
            Ok(enrichment) => enrichment,
            Err(e @ EnrichmentError::NoOrganization) => {
                debug!("Enrichment found no organization for {}", bag.company_name);
                stage_failures.push(StageFailure {
                    stage: Stage::Enrich,
                    message: e.to_string(),
                });
                return;
            }
            Err(e) => {
                warn!("Enrichment failed for {}: {}", bag.company_name, e);
                stage_failures.push(StageFailure {
                    stage: Stage::Enrich,
                    message: e.to_string(),
                });
                return;
            }
        };

        let org = &enrichment.organization;
        let patch = CompanyPatch {
            industry: org.industry.clone(),
            employee_count_range: org.estimated_num_employees.as_ref().and_then(value_to_string),
            revenue_range: org.estimated_annual_revenue.as_ref().and_then(value_to_string),
            technologies_used: (!org.technologies.is_empty()).then(|| org.technologies.clone()),
            linkedin_url: org.linkedin_url.clone(),
            enrichment_org_id: org.id.clone(),
            ..Default::default()
        };
        if let Err(e) = self.store.update_company(prospect_id, &patch).await {
            warn!("Could not persist enrichment results: {}", e);
        }

        for record in &enrichment.contacts {
            let contact = contact_from_enrichment(record, prospect_id, user_id);
            if let Some(linkedin) = &contact.linkedin_profile_url {
                contact_targets.push((contact.id.clone(), linkedin.clone()));
            }
            if let Err(e) = self.store.insert_contact(&contact).await {
                warn!("Could not persist enrichment contact: {}", e);
            }
        }

        info!(
            "Enrichment found {} contacts for {}",
            enrichment.contacts.len(),
            bag.company_name
        );
        bag.enrichment = Some(enrichment);
    }

    async fn stage_company_profile(&self, bag: &mut RawDataBag) {
        let (Some(profiles), Some(url)) = (&self.profiles, bag.linkedin_url.clone()) else {
            debug!("Profile source or LinkedIn URL missing, skipping company scrape");
            return;
        };

        // One lock per scrape keeps the session single-owner while letting
        // other prospects interleave between scrapes.
        let scraped = profiles.lock().await.scrape_company(&url).await;
        match scraped {
            Some(company) => bag.linkedin_company = Some(company),
            None => debug!("No company profile data for {}", url),
        }
    }

    async fn stage_contact_profiles(
        &self,
        bag: &mut RawDataBag,
        contact_targets: &[(String, String)],
    ) {
        let Some(profiles) = &self.profiles else {
            return;
        };

        for (contact_id, url) in contact_targets {
            let scraped = profiles.lock().await.scrape_profile(url).await;
            let Some(profile) = scraped else {
                debug!("No profile data for {}", url);
                continue;
            };

            let patch = ContactPatch {
                profile_summary: profile.about.clone(),
                current_work_summary: Some(profile.current_work_summary()),
                past_work_summary: Some(profile.past_work_summary()),
                accomplishments_summary: Some(profile.accomplishments_summary()),
                recent_activity: Some(
                    profile.recent_activity.iter().map(|a| a.content.clone()).collect(),
                ),
                ..Default::default()
            };
            if let Err(e) = self.store.update_contact(contact_id, &patch).await {
                warn!("Could not persist profile data for contact {}: {}", contact_id, e);
            }

            bag.individual_profiles.push(ProfileCapture {
                source_url: url.clone(),
                profile,
            });
        }
    }

    async fn stage_normalize(
        &self,
        prospect_id: &str,
        user_id: &str,
        bag: RawDataBag,
        stage_failures: Vec<StageFailure>,
        started: Instant,
    ) -> ProspectOutcome {
        let outcome = |status, score, contacts: usize, error: Option<String>| ProspectOutcome {
            prospect_id: prospect_id.to_string(),
            company_name: bag.company_name.clone(),
            status,
            data_quality_score: score,
            contact_count: contacts,
            stage_failures: stage_failures.clone(),
            error,
            processing_time_ms: started.elapsed().as_millis() as u64,
        };

        let Some(normalizer) = &self.normalizer else {
            info!(
                "Normalizer not configured; {} finishes with partial data",
                bag.company_name
            );
            let _ = self
                .store
                .update_company(
                    prospect_id,
                    &CompanyPatch {
                        status: Some(ProspectStatus::PartialData),
                        campaign_status: Some("Partial Data".to_string()),
                        ..Default::default()
                    },
                )
                .await;
            return outcome(ProspectStatus::PartialData, None, 0, None);
        };

        match normalizer.transform(&bag).await {
            Ok(record) => {
                let score = record.data_quality_score;
                let contact_count = record.contacts.len();
                if let Err(e) = self.persist_canonical(prospect_id, user_id, &record).await {
                    error!("Could not persist canonical record: {}", e);
                    let _ = self.mark_error(prospect_id).await;
                    return outcome(ProspectStatus::Error, None, 0, Some(e.to_string()));
                }
                outcome(ProspectStatus::Ready, score, contact_count, None)
            }
            Err(e) => {
                error!("Normalization failed for {}: {}", bag.company_name, e);
                let _ = self.mark_error(prospect_id).await;
                outcome(ProspectStatus::Error, None, 0, Some(e.to_string()))
            }
        }
    }

    async fn mark_error(&self, prospect_id: &str) -> Result<(), crate::error::StorageError> {
        self.store
            .update_company(
                prospect_id,
                &CompanyPatch {
                    status: Some(ProspectStatus::Error),
                    campaign_status: Some("Error".to_string()),
                    ..Default::default()
                },
            )
            .await
    }

    /// Writes the validated canonical record back: company fields, terminal
    /// status, and contacts merged into the rows the enrichment stage already
    /// created (matched by email, then name).
    async fn persist_canonical(
        &self,
        prospect_id: &str,
        user_id: &str,
        record: &CanonicalRecord,
    ) -> Result<(), crate::error::StorageError> {
        let company = &record.company;
        let patch = CompanyPatch {
            company_name: Some(company.name.clone()),
            industry: Some(company.industry.clone()),
            linkedin_url: company.linkedin_url.clone(),
            revenue_range: company.revenue_range.clone(),
            employee_count_range: company.employee_count_range.clone(),
            technologies_used: Some(company.technologies_used.clone()),
            mission_summary: company.mission_vision_offerings_summary.clone(),
            recent_activity_summary: company.recent_company_activity_summary.clone(),
            contact_form_url: company.contact_form_url.clone(),
            description: company.description.clone(),
            founded_year: company.founded_year,
            headquarters: company.headquarters.clone(),
            status: Some(ProspectStatus::Ready),
            campaign_status: record.campaign_status.clone(),
            data_quality_score: record.data_quality_score,
            enrichment_timestamp: record.enrichment_timestamp,
            ..Default::default()
        };
        self.store.update_company(prospect_id, &patch).await?;

        let existing = self.store.get_contacts_by_company(prospect_id).await?;
        for canonical in &record.contacts {
            let matched = existing.iter().find(|stored| {
                stored
                    .email_primary
                    .as_deref()
                    .map(|email| email.eq_ignore_ascii_case(&canonical.email_primary))
                    .unwrap_or(false)
                    || stored.name == canonical.name
            });

            match matched {
                Some(stored) => {
                    let patch = ContactPatch {
                        title: canonical.title.clone(),
                        email_primary: Some(canonical.email_primary.clone()),
                        email_other_business: Some(canonical.email_other_business.clone()),
                        email_personal_staff: Some(canonical.email_personal_staff.clone()),
                        email_executive: Some(canonical.email_executive.clone()),
                        phone_numbers: (!canonical.phone_numbers.is_empty())
                            .then(|| canonical.phone_numbers.clone()),
                        social_profiles: (!canonical.social_profiles.is_empty())
                            .then(|| canonical.social_profiles.clone()),
                        profile_summary: canonical.scraped_linkedin_profile_summary.clone(),
                        recent_activity: (!canonical.scraped_linkedin_recent_activity.is_empty())
                            .then(|| canonical.scraped_linkedin_recent_activity.clone()),
                        accomplishments_summary: canonical.scraped_accomplishments_summary.clone(),
                        past_work_summary: canonical.scraped_past_work_summary.clone(),
                        current_work_summary: canonical.scraped_current_work_summary.clone(),
                        online_contributions_summary: canonical
                            .scraped_online_contributions_summary
                            .clone(),
                        seniority_level: canonical.seniority_level.clone(),
                        departments: (!canonical.departments.is_empty())
                            .then(|| canonical.departments.clone()),
                        ..Default::default()
                    };
                    self.store.update_contact(&stored.id, &patch).await?;
                }
                None => {
                    let contact = contact_from_canonical(canonical, prospect_id, user_id);
                    self.store.insert_contact(&contact).await?;
                }
            }
        }

        Ok(())
    }

    /// Processes each CSV row independently with bounded concurrency. Always
    /// returns one result per non-blank row, errored rows included, so the
    /// caller can reconcile row count to result count 1:1.
    pub async fn process_companies_from_csv(
        &self,
        user_id: &str,
        csv_data: &str,
    ) -> Vec<RowOutcome> {
        let rows = match parse_csv(csv_data) {
            Ok(rows) => rows,
            Err(message) => {
                error!("CSV import rejected: {}", message);
                return vec![RowOutcome {
                    line: 1,
                    company_name: None,
                    outcome: Err(message),
                }];
            }
        };

        info!("Processing {} companies from CSV", rows.len());
        let results: Vec<RowOutcome> = futures::stream::iter(rows.into_iter().map(|row| async move {
            match row.company_name.clone() {
                None => RowOutcome {
                    line: row.line,
                    company_name: None,
                    outcome: Err(format!("line {}: missing company name", row.line)),
                },
                Some(name) => {
                    let outcome = self
                        .process_company(
                            user_id,
                            &name,
                            row.website_url.as_deref(),
                            row.linkedin_url.as_deref(),
                        )
                        .await;
                    RowOutcome {
                        line: row.line,
                        company_name: Some(name),
                        outcome: Ok(outcome),
                    }
                }
            }
        }))
        .buffered(self.config.max_concurrent_prospects.max(1))
        .collect()
        .await;

        info!("CSV batch complete: {} results", results.len());
        results
    }

    /// Closes the shared profile session, if any. Called on shutdown.
    pub async fn close(&self) {
        if let Some(profiles) = &self.profiles {
            profiles.lock().await.close().await;
        }
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn contact_from_enrichment(record: &ContactRecord, prospect_id: &str, user_id: &str) -> StoredContact {
    let name = record
        .name
        .clone()
        .or_else(|| match (&record.first_name, &record.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "Unknown".to_string());

    let mut contact = StoredContact::new(&Uuid::new_v4().to_string(), prospect_id, user_id, &name);
    contact.enrichment_contact_id = record.id.clone();
    contact.title = record.title.clone();
    contact.email_primary = record.email.clone();
    contact.phone_numbers = record.phone_numbers.clone();
    contact.linkedin_profile_url = record.linkedin_url.clone();
    contact.seniority_level = record.seniority.clone();
    contact.departments = record.departments.clone();
    contact
}

fn contact_from_canonical(
    canonical: &crate::normalizer::schema::CanonicalContact,
    prospect_id: &str,
    user_id: &str,
) -> StoredContact {
    let mut contact =
        StoredContact::new(&Uuid::new_v4().to_string(), prospect_id, user_id, &canonical.name);
    contact.title = canonical.title.clone();
    contact.email_primary = Some(canonical.email_primary.clone());
    contact.email_other_business = canonical.email_other_business.clone();
    contact.email_personal_staff = canonical.email_personal_staff.clone();
    contact.email_executive = canonical.email_executive.clone();
    contact.phone_numbers = canonical.phone_numbers.clone();
    contact.social_profiles =
        (!canonical.social_profiles.is_empty()).then(|| canonical.social_profiles.clone());
    contact.profile_summary = canonical.scraped_linkedin_profile_summary.clone();
    contact.recent_activity = canonical.scraped_linkedin_recent_activity.clone();
    contact.accomplishments_summary = canonical.scraped_accomplishments_summary.clone();
    contact.past_work_summary = canonical.scraped_past_work_summary.clone();
    contact.current_work_summary = canonical.scraped_current_work_summary.clone();
    contact.online_contributions_summary = canonical.scraped_online_contributions_summary.clone();
    contact.seniority_level = canonical.seniority_level.clone();
    contact.departments = canonical.departments.clone();
    contact.enrichment_contact_id = canonical.enrichment_contact_id.clone();
    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnrichmentConfig, HttpConfig};
    use crate::error::LlmError;
    use crate::http_client::RateLimitedHttpClient;
    use crate::linkedin::types::{ExperienceEntry, RawLinkedInCompany, RawLinkedInProfile};
    use crate::llm::CompletionClient;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FakeLlm {
        response: String,
    }

    #[async_trait]
    impl CompletionClient for FakeLlm {
        async fn complete(&self, _: &str, _: f32, _: u32) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    struct FakeProfiles {
        closed: Arc<AtomicBool>,
        company_delay: Option<Duration>,
    }

    #[async_trait]
    impl ProfileSource for FakeProfiles {
        async fn login(&mut self) -> bool {
            true
        }

        async fn scrape_company(&mut self, url: &str) -> Option<RawLinkedInCompany> {
            if let Some(delay) = self.company_delay {
                tokio::time::sleep(delay).await;
            }
            Some(RawLinkedInCompany {
                name: "Acme Inc".to_string(),
                url: url.to_string(),
                industry: Some("Aerospace".to_string()),
                ..Default::default()
            })
        }

        async fn scrape_profile(&mut self, url: &str) -> Option<RawLinkedInProfile> {
            Some(RawLinkedInProfile {
                name: "Jo Example".to_string(),
                url: url.to_string(),
                about: Some("Veteran engineering leader".to_string()),
                experience: vec![ExperienceEntry {
                    role: "CTO".to_string(),
                    company: "Acme".to_string(),
                    date_range: None,
                }],
                ..Default::default()
            })
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn test_pipeline_config(timeout_seconds: u64) -> PipelineConfig {
        PipelineConfig {
            max_concurrent_prospects: 2,
            prospect_timeout_seconds: timeout_seconds,
            max_contacts_per_company: 5,
        }
    }

    fn valid_canonical_json() -> String {
        serde_json::json!({
            "company": {
                "name": "Acme Incorporated",
                "website_url": "https://acme.com",
                "industry": "Aerospace manufacturing",
                "technologies_used": ["React"]
            },
            "contacts": [
                {"name": "Jo Example", "email_primary": "jo@acme.com", "title": "CTO"}
            ]
        })
        .to_string()
    }

    fn normalizer_with(response: &str) -> NormalizationEngine {
        NormalizationEngine::new(
            Arc::new(FakeLlm {
                response: response.to_string(),
            }),
            0.2,
            8192,
        )
    }

    #[tokio::test]
    async fn csv_row_without_normalizer_ends_partial_data() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store.clone(), test_pipeline_config(60));

        let results = coordinator
            .process_companies_from_csv(
                "u1",
                "Company Name,Website URL,LinkedIn URL\n\
                 Acme Inc,https://acme.com,https://linkedin.com/company/acme\n",
            )
            .await;

        assert_eq!(results.len(), 1);
        let outcome = results[0].outcome.as_ref().unwrap();
        assert_eq!(outcome.status, ProspectStatus::PartialData);

        let stored = store.get_company(&outcome.prospect_id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProspectStatus::PartialData);
        assert_eq!(stored.campaign_status, "Partial Data");
        assert_eq!(stored.website_url.as_deref(), Some("https://acme.com"));
    }

    #[tokio::test]
    async fn normalization_success_marks_ready_and_persists_contacts() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store.clone(), test_pipeline_config(60))
            .with_normalizer(normalizer_with(&valid_canonical_json()));

        let outcome = coordinator
            .process_company("u1", "Acme Inc", Some("https://acme.com"), None)
            .await;

        assert_eq!(outcome.status, ProspectStatus::Ready);
        assert_eq!(outcome.contact_count, 1);
        assert!(outcome.data_quality_score.unwrap() > 0);

        let stored = store.get_company(&outcome.prospect_id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProspectStatus::Ready);
        assert_eq!(stored.company_name, "Acme Incorporated");
        assert_eq!(stored.industry.as_deref(), Some("Aerospace manufacturing"));
        assert!(stored.data_quality_score.is_some());

        let contacts = store.get_contacts_by_company(&outcome.prospect_id).await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].email_primary.as_deref(), Some("jo@acme.com"));
    }

    #[tokio::test]
    async fn validation_failure_marks_error_but_batch_continues() {
        let empty_contacts = serde_json::json!({
            "company": {
                "name": "Acme Incorporated",
                "website_url": "https://acme.com",
                "industry": "Aerospace"
            },
            "contacts": []
        })
        .to_string();

        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store.clone(), test_pipeline_config(60))
            .with_normalizer(normalizer_with(&empty_contacts));

        let results = coordinator
            .process_companies_from_csv(
                "u1",
                "Company Name\nAcme Inc\nGlobex Corp\n",
            )
            .await;

        // Both rows processed, both terminal Error; neither silently Ready.
        assert_eq!(results.len(), 2);
        for row in &results {
            let outcome = row.outcome.as_ref().unwrap();
            assert_eq!(outcome.status, ProspectStatus::Error);
            assert!(outcome.error.as_deref().unwrap().contains("validation"));
            let stored = store.get_company(&outcome.prospect_id).await.unwrap().unwrap();
            assert_eq!(stored.status, ProspectStatus::Error);
        }
    }

    #[tokio::test]
    async fn invalid_header_yields_single_error_entry() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store, test_pipeline_config(60));

        let results = coordinator
            .process_companies_from_csv("u1", "Name,URL\nAcme,https://acme.com\n")
            .await;
        assert_eq!(results.len(), 1);
        assert!(results[0].outcome.is_err());
    }

    #[tokio::test]
    async fn nameless_rows_error_without_aborting_the_batch() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store, test_pipeline_config(60));

        let results = coordinator
            .process_companies_from_csv(
                "u1",
                "Company Name,Website URL\n,https://nameless.example\nAcme Inc,\n",
            )
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].outcome.is_err());
        let ok = results[1].outcome.as_ref().unwrap();
        assert_eq!(ok.company_name, "Acme Inc");
    }

    #[tokio::test]
    async fn timeout_cancels_closes_browser_and_marks_error() {
        let closed = Arc::new(AtomicBool::new(false));
        let profiles: SharedProfileSource = Arc::new(Mutex::new(Box::new(FakeProfiles {
            closed: closed.clone(),
            company_delay: Some(Duration::from_secs(30)),
        })));

        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store.clone(), test_pipeline_config(1))
            .with_profiles(profiles);

        let outcome = coordinator
            .process_company(
                "u1",
                "Acme Inc",
                None,
                Some("https://linkedin.com/company/acme"),
            )
            .await;

        assert_eq!(outcome.status, ProspectStatus::Error);
        assert!(outcome.error.as_deref().unwrap().contains("cancelled"));
        assert!(closed.load(Ordering::SeqCst));

        let stored = store.get_company(&outcome.prospect_id).await.unwrap().unwrap();
        assert_eq!(stored.status, ProspectStatus::Error);
    }

    #[tokio::test]
    async fn full_run_scrapes_profiles_for_enriched_contacts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/organizations/enrich"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organization": {
                    "id": "org_1",
                    "name": "Acme Inc",
                    "industry": "Aerospace",
                    "estimated_num_employees": 250,
                    "technologies": ["React"]
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mixed_people/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "people": [{
                    "id": "person_1",
                    "name": "Jo Example",
                    "title": "CTO",
                    "email": "jo@acme.com",
                    "email_status": "verified",
                    "linkedin_url": "https://linkedin.com/in/jo"
                }]
            })))
            .mount(&server)
            .await;

        let http = RateLimitedHttpClient::new(
            &HttpConfig {
                rate_limit_calls: 100,
                rate_limit_window_ms: 1000,
                max_retries: 0,
                retry_base_delay_ms: 1,
                timeout_seconds: 5,
            },
            "test-agent",
        )
        .unwrap();
        let enrichment = EnrichmentClient::new(
            http,
            &EnrichmentConfig {
                base_url: server.uri(),
            },
            "test-key".to_string(),
        );

        let profiles: SharedProfileSource = Arc::new(Mutex::new(Box::new(FakeProfiles {
            closed: Arc::new(AtomicBool::new(false)),
            company_delay: None,
        })));

        let store = Arc::new(MemoryStore::new());
        let coordinator = PipelineCoordinator::new(store.clone(), test_pipeline_config(60))
            .with_enrichment(enrichment)
            .with_profiles(profiles)
            .with_normalizer(normalizer_with(&valid_canonical_json()));

        let outcome = coordinator
            .process_company(
                "u1",
                "Acme Inc",
                Some("https://www.acme.com"),
                Some("https://linkedin.com/company/acme"),
            )
            .await;

        assert_eq!(outcome.status, ProspectStatus::Ready);

        let contacts = store.get_contacts_by_company(&outcome.prospect_id).await.unwrap();
        assert_eq!(contacts.len(), 1);
        // The enrichment contact was created, profile-scraped, then merged
        // with the canonical record (matched by email).
        assert_eq!(contacts[0].enrichment_contact_id.as_deref(), Some("person_1"));
        assert_eq!(
            contacts[0].current_work_summary.as_deref(),
            Some("CTO at Acme. Veteran engineering leader")
        );
        assert_eq!(contacts[0].title.as_deref(), Some("CTO"));

        let stored = store.get_company(&outcome.prospect_id).await.unwrap().unwrap();
        assert_eq!(stored.enrichment_org_id.as_deref(), Some("org_1"));
        assert_eq!(stored.employee_count_range.as_deref(), Some("250"));
    }
}
