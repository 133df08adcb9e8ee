// src/config.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub http: HttpConfig,
    pub crawler: CrawlerConfig,
    pub linkedin: LinkedInConfig,
    pub enrichment: EnrichmentConfig,
    pub llm: LlmConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub max_concurrent_prospects: usize,
    pub prospect_timeout_seconds: u64,
    pub max_contacts_per_company: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub rate_limit_calls: u32,
    pub rate_limit_window_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    pub max_pages: usize,
    pub max_depth: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinkedInConfig {
    pub headless: bool,
    pub cookies_path: String,
    pub page_load_timeout_seconds: u64,
    pub checkpoint_wait_seconds: u64,
    pub scroll_pixel_min: u32,
    pub scroll_pixel_max: u32,
    pub scroll_pause_min_ms: u64,
    pub scroll_pause_max_ms: u64,
    pub action_pause_min_ms: u64,
    pub action_pause_max_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub transform_temperature: f32,
    pub transform_max_tokens: u32,
    pub draft_temperature: f32,
    pub draft_max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    pub delay_between_emails_ms: u64,
    pub from_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                max_concurrent_prospects: 3,
                prospect_timeout_seconds: 600,
                max_contacts_per_company: 5,
            },
            http: HttpConfig {
                rate_limit_calls: 3,
                rate_limit_window_ms: 1000,
                max_retries: 3,
                retry_base_delay_ms: 500,
                timeout_seconds: 30,
            },
            crawler: CrawlerConfig {
                max_pages: 10,
                max_depth: 2,
                timeout_seconds: 10,
                user_agent: "Mozilla/5.0 (compatible; OutreachCrawler/1.0)".to_string(),
            },
            linkedin: LinkedInConfig {
                headless: true,
                cookies_path: "data/linkedin_cookies.json".to_string(),
                page_load_timeout_seconds: 30,
                checkpoint_wait_seconds: 30,
                scroll_pixel_min: 300,
                scroll_pixel_max: 700,
                scroll_pause_min_ms: 800,
                scroll_pause_max_ms: 2500,
                action_pause_min_ms: 1000,
                action_pause_max_ms: 3000,
            },
            enrichment: EnrichmentConfig {
                base_url: "https://api.apollo.io/v1".to_string(),
            },
            llm: LlmConfig {
                base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-pro".to_string(),
                transform_temperature: 0.2,
                transform_max_tokens: 8192,
                draft_temperature: 0.7,
                draft_max_tokens: 1000,
            },
            email: EmailConfig {
                delay_between_emails_ms: 3000,
                from_name: "Outreach Pipeline".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

pub async fn load_config(path: &str) -> crate::models::Result<Config> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Secrets come from the environment (via dotenv), never from config.yml.
/// Each collaborator is optional; the pipeline skips stages whose secret is
/// missing.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub apollo_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub linkedin_username: Option<String>,
    pub linkedin_password: Option<String>,
    pub gmail_access_token: Option<String>,
    pub outlook_access_token: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        let get = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            apollo_api_key: get("APOLLO_API_KEY"),
            gemini_api_key: get("GEMINI_API_KEY"),
            linkedin_username: get("LINKEDIN_USERNAME"),
            linkedin_password: get("LINKEDIN_PASSWORD"),
            gmail_access_token: get("GMAIL_ACCESS_TOKEN"),
            outlook_access_token: get("OUTLOOK_ACCESS_TOKEN"),
        }
    }
}
