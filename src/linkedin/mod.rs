// src/linkedin/mod.rs
pub mod scraper;
pub mod session;
pub mod types;

use async_trait::async_trait;

pub use scraper::{LinkedInCredentials, LinkedInScraper};
pub use types::{
    AccomplishmentGroup, CompanyUpdate, ExperienceEntry, ProfileActivity, RawLinkedInCompany,
    RawLinkedInProfile,
};

/// Narrow capability interface over the profile data source. Browser
/// automation is fragile, so the coordinator only ever sees this trait and
/// tests run against a fake.
///
/// `None` from a scrape means "no data", never an error to propagate.
#[async_trait]
pub trait ProfileSource: Send {
    async fn login(&mut self) -> bool;
    async fn scrape_company(&mut self, url: &str) -> Option<RawLinkedInCompany>;
    async fn scrape_profile(&mut self, url: &str) -> Option<RawLinkedInProfile>;
    async fn close(&mut self);
}
