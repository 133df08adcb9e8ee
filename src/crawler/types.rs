// src/crawler/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything a site crawl produced for one company. Consumed by the
/// normalization stage as the "website" section of the raw-data bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWebsiteData {
    pub scraped_url: String,
    pub domain: String,
    /// Head-truncated (sentence-boundary-aware) summary of all page text.
    pub text_snippet: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    /// First discovered contact page, if any.
    pub contact_form_url: Option<String>,
    pub all_contact_urls: Vec<String>,
    /// Platform name -> first URL found for that platform.
    pub social_profiles: BTreeMap<String, String>,
    pub technologies_detected: Vec<String>,
    pub crawled_page_count: usize,
    /// Pages that failed to fetch or parse; the crawl itself never fails.
    pub page_errors: usize,
    pub raw_text_length: usize,
    pub scraped_at: DateTime<Utc>,
}

impl RawWebsiteData {
    pub fn empty(url: &str, domain: &str) -> Self {
        Self {
            scraped_url: url.to_string(),
            domain: domain.to_string(),
            text_snippet: String::new(),
            emails: Vec::new(),
            phones: Vec::new(),
            contact_form_url: None,
            all_contact_urls: Vec::new(),
            social_profiles: BTreeMap::new(),
            technologies_detected: Vec::new(),
            crawled_page_count: 0,
            page_errors: 0,
            raw_text_length: 0,
            scraped_at: Utc::now(),
        }
    }
}
