// src/cli/cli.rs
use std::fmt;
use std::sync::Arc;

use crate::config::{Config, Secrets};
use crate::crawler::WebsiteCrawler;
use crate::enrichment::EnrichmentClient;
use crate::http_client::RateLimitedHttpClient;
use crate::linkedin::{LinkedInCredentials, LinkedInScraper, ProfileSource};
use crate::llm::{CompletionClient, GeminiClient};
use crate::normalizer::NormalizationEngine;
use crate::outreach::{EmailGenerator, EmailSender};
use crate::pipeline::{PipelineCoordinator, SharedProfileSource};
use crate::storage::sqlite::DbPool;
use crate::storage::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ImportCsv,
    ProcessSingleCompany,
    DraftAndSendEmail,
    ShowStats,
    Exit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::ImportCsv => "📥 Import prospects from CSV",
            MenuAction::ProcessSingleCompany => "🏢 Process a single company",
            MenuAction::DraftAndSendEmail => "✉️  Draft and send outreach email",
            MenuAction::ShowStats => "📊 Show database stats",
            MenuAction::Exit => "👋 Exit",
        };
        write!(f, "{}", label)
    }
}

pub struct CliApp {
    pub config: Config,
    pub secrets: Secrets,
    pub pool: DbPool,
    pub store: Arc<SqliteStore>,
}

impl CliApp {
    pub fn new(config: Config, secrets: Secrets, pool: DbPool) -> Self {
        let store = Arc::new(SqliteStore::new(pool.clone()));
        Self {
            config,
            secrets,
            pool,
            store,
        }
    }

    /// Assembles the coordinator from whatever collaborators have secrets
    /// configured; the pipeline skips the rest.
    pub fn build_coordinator(&self) -> crate::models::Result<PipelineCoordinator> {
        let http = RateLimitedHttpClient::new(&self.config.http, &self.config.crawler.user_agent)?;

        let mut coordinator =
            PipelineCoordinator::new(self.store.clone(), self.config.pipeline.clone())
                .with_crawler(WebsiteCrawler::new(http.clone(), &self.config.crawler));

        if let Some(api_key) = &self.secrets.apollo_api_key {
            coordinator = coordinator.with_enrichment(EnrichmentClient::new(
                http.clone(),
                &self.config.enrichment,
                api_key.clone(),
            ));
        } else {
            tracing::warn!("APOLLO_API_KEY not set; enrichment stage will be skipped");
        }

        if let (Some(username), Some(password)) = (
            &self.secrets.linkedin_username,
            &self.secrets.linkedin_password,
        ) {
            let scraper = LinkedInScraper::new(
                LinkedInCredentials {
                    username: username.clone(),
                    password: password.clone(),
                },
                self.config.linkedin.clone(),
            );
            let shared: SharedProfileSource =
                Arc::new(tokio::sync::Mutex::new(Box::new(scraper) as Box<dyn ProfileSource>));
            coordinator = coordinator.with_profiles(shared);
        } else {
            tracing::warn!("LinkedIn credentials not set; profile stages will be skipped");
        }

        if let Some(api_key) = &self.secrets.gemini_api_key {
            let llm: Arc<dyn CompletionClient> =
                Arc::new(GeminiClient::new(http, &self.config.llm, api_key.clone()));
            coordinator = coordinator.with_normalizer(NormalizationEngine::new(
                llm,
                self.config.llm.transform_temperature,
                self.config.llm.transform_max_tokens,
            ));
        } else {
            tracing::warn!("GEMINI_API_KEY not set; normalization stage will be skipped");
        }

        Ok(coordinator)
    }

    pub fn build_generator(&self) -> crate::models::Result<EmailGenerator> {
        let api_key = self
            .secrets
            .gemini_api_key
            .clone()
            .ok_or("GEMINI_API_KEY is required for draft generation")?;
        let http = RateLimitedHttpClient::new(&self.config.http, &self.config.crawler.user_agent)?;
        let llm: Arc<dyn CompletionClient> =
            Arc::new(GeminiClient::new(http, &self.config.llm, api_key));
        Ok(EmailGenerator::new(
            llm,
            self.config.llm.draft_temperature,
            self.config.llm.draft_max_tokens,
        ))
    }

    pub fn build_sender(&self) -> crate::models::Result<EmailSender> {
        let http = RateLimitedHttpClient::new(&self.config.http, &self.config.crawler.user_agent)?;
        Ok(EmailSender::new(
            http,
            self.secrets.gmail_access_token.clone(),
            self.secrets.outlook_access_token.clone(),
            self.config.email.delay_between_emails_ms,
        ))
    }
}
