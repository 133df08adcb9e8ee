// src/enrichment/mod.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::EnrichmentConfig;
use crate::error::EnrichmentError;
use crate::http_client::RateLimitedHttpClient;

/// Canonical org record resolved by the contact-discovery API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub website_url: Option<String>,
    pub primary_domain: Option<String>,
    pub linkedin_url: Option<String>,
    pub industry: Option<String>,
    pub estimated_num_employees: Option<Value>,
    pub estimated_annual_revenue: Option<Value>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub founded_year: Option<i64>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub short_description: Option<String>,
}

/// One decision-maker contact with a verified email.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub email_status: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
    pub seniority: Option<String>,
    #[serde(default)]
    pub departments: Vec<String>,
}

/// Combined org + contacts result consumed by normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEnrichment {
    pub organization: OrgRecord,
    pub contacts: Vec<ContactRecord>,
    pub enriched_at: DateTime<Utc>,
}

const DEFAULT_TITLES: [&str; 17] = [
    "CEO",
    "Chief Executive Officer",
    "CTO",
    "Chief Technology Officer",
    "CMO",
    "Chief Marketing Officer",
    "CFO",
    "Chief Financial Officer",
    "COO",
    "Chief Operating Officer",
    "Founder",
    "Co-Founder",
    "VP",
    "Vice President",
    "Director",
    "Head of",
    "Manager",
];

const DEFAULT_SENIORITIES: [&str; 4] = ["director", "vp", "c_suite", "founder"];

/// REST client for the contact-discovery API. Every call goes through the
/// shared rate-limited HTTP client; expected empty results come back as typed
/// errors so the coordinator can branch without unwinding.
pub struct EnrichmentClient {
    http: RateLimitedHttpClient,
    base_url: String,
    api_key: String,
}

impl EnrichmentClient {
    pub fn new(http: RateLimitedHttpClient, config: &EnrichmentConfig, api_key: String) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("Cache-Control", "no-cache".to_string()),
            ("X-Api-Key", self.api_key.clone()),
        ]
    }

    /// Resolves a company to its canonical org record. Exactly one of
    /// domain/name is required; domain is preferred and canonicalized.
    pub async fn enrich_company(
        &self,
        domain: Option<&str>,
        name: Option<&str>,
    ) -> Result<OrgRecord, EnrichmentError> {
        if domain.is_none() && name.is_none() {
            return Err(EnrichmentError::MissingIdentifier);
        }

        let mut body = json!({});
        if let Some(domain) = domain {
            body["domain"] = json!(clean_domain(domain));
        }
        if let Some(name) = name {
            body["name"] = json!(name);
        }

        info!(
            "Enriching company data for {}",
            domain.map(clean_domain).unwrap_or_else(|| name.unwrap_or("").to_string())
        );

        let url = format!("{}/organizations/enrich", self.base_url);
        let response = self.http.post_json(&url, &self.headers(), &body).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| EnrichmentError::BadResponse(e.to_string()))?;

        let organization = payload.get("organization").cloned().unwrap_or(Value::Null);
        if organization.is_null() {
            warn!("No organization found for {:?} / {:?}", domain, name);
            return Err(EnrichmentError::NoOrganization);
        }

        let record: OrgRecord = serde_json::from_value(organization)
            .map_err(|e| EnrichmentError::BadResponse(e.to_string()))?;
        info!(
            "Enriched company: {}",
            record.name.as_deref().unwrap_or("unknown")
        );
        Ok(record)
    }

    /// Searches ranked decision-maker contacts for a company. Falls back to
    /// the curated title list and seniority set when the caller supplies
    /// none; only contacts with a verified email are ever returned.
    pub async fn find_contacts(
        &self,
        org_id: Option<&str>,
        domain: Option<&str>,
        name: Option<&str>,
        titles: &[String],
        seniorities: &[String],
        limit: usize,
    ) -> Result<Vec<ContactRecord>, EnrichmentError> {
        if org_id.is_none() && domain.is_none() && name.is_none() {
            return Err(EnrichmentError::MissingIdentifier);
        }

        let titles: Vec<String> = if titles.is_empty() {
            DEFAULT_TITLES.iter().map(|t| t.to_string()).collect()
        } else {
            titles.to_vec()
        };
        let seniorities: Vec<String> = if seniorities.is_empty() {
            DEFAULT_SENIORITIES.iter().map(|s| s.to_string()).collect()
        } else {
            seniorities.to_vec()
        };

        let mut body = json!({
            "page": 1,
            "per_page": limit,
            "contact_email_status": ["verified"],
            "person_titles": titles,
            "person_seniorities": seniorities,
        });
        if let Some(org_id) = org_id {
            body["organization_ids"] = json!([org_id]);
        } else if let Some(domain) = domain {
            body["q_organization_domains"] = json!([clean_domain(domain)]);
        } else if let Some(name) = name {
            body["q_organization_name"] = json!(name);
        }

        let url = format!("{}/mixed_people/search", self.base_url);
        let response = self.http.post_json(&url, &self.headers(), &body).await?;
        let payload: Value = response
            .json()
            .await
            .map_err(|e| EnrichmentError::BadResponse(e.to_string()))?;

        let people = payload
            .get("people")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if people.is_empty() {
            warn!("No contacts found for {:?}", org_id.or(domain).or(name));
            return Err(EnrichmentError::NoContacts);
        }

        let contacts: Vec<ContactRecord> = people
            .iter()
            .map(parse_person)
            .filter(|c| c.email_status.as_deref() == Some("verified"))
            .take(limit)
            .collect();

        if contacts.is_empty() {
            return Err(EnrichmentError::NoContacts);
        }

        info!("Found {} verified contacts", contacts.len());
        Ok(contacts)
    }

    /// Combined enrich-then-search. A missing organization propagates; a
    /// missing contact list degrades to an empty vec so the pipeline can
    /// still normalize whatever else it has.
    pub async fn enrich_company_and_contacts(
        &self,
        domain: Option<&str>,
        name: Option<&str>,
        max_contacts: usize,
    ) -> Result<RawEnrichment, EnrichmentError> {
        let organization = self.enrich_company(domain, name).await?;

        let contacts = match organization.id.as_deref() {
            Some(org_id) => {
                self.find_contacts(Some(org_id), None, None, &[], &[], max_contacts)
                    .await
            }
            None => {
                self.find_contacts(None, domain, name, &[], &[], max_contacts)
                    .await
            }
        };

        let contacts = match contacts {
            Ok(contacts) => contacts,
            Err(EnrichmentError::NoContacts) => Vec::new(),
            Err(e) => return Err(e),
        };

        Ok(RawEnrichment {
            organization,
            contacts,
            enriched_at: Utc::now(),
        })
    }
}

fn parse_person(person: &Value) -> ContactRecord {
    let get_str = |key: &str| {
        person
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    };
    let get_list = |key: &str| {
        person
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    };

    // The LinkedIn URL may arrive directly or inside the account links list.
    let linkedin_url = get_str("linkedin_url").or_else(|| {
        person
            .get("account_links")
            .and_then(Value::as_array)
            .and_then(|links| {
                links.iter().find_map(|link| {
                    if link.get("type").and_then(Value::as_str) == Some("linkedin_url") {
                        link.get("url").and_then(Value::as_str).map(|s| s.to_string())
                    } else {
                        None
                    }
                })
            })
    });

    ContactRecord {
        id: get_str("id"),
        name: get_str("name"),
        first_name: get_str("first_name"),
        last_name: get_str("last_name"),
        title: get_str("title"),
        email: get_str("email"),
        email_status: get_str("email_status"),
        linkedin_url,
        phone_numbers: get_list("phone_numbers"),
        seniority: get_str("seniority"),
        departments: get_list("departments"),
    }
}

/// Strips scheme, a leading `www.`, and any path/query from a URL, leaving
/// the bare domain.
pub fn clean_domain(url: &str) -> String {
    let mut domain = url.trim();
    domain = domain.strip_prefix("https://").unwrap_or(domain);
    domain = domain.strip_prefix("http://").unwrap_or(domain);
    domain = domain.strip_prefix("www.").unwrap_or(domain);
    domain.split('/').next().unwrap_or("").to_string()
}
