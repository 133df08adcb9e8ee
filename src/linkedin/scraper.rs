// src/linkedin/scraper.rs
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::LinkedInConfig;
use crate::linkedin::session::{load_cookies, save_cookies, StoredCookie};
use crate::linkedin::types::{
    AccomplishmentGroup, CompanyUpdate, ExperienceEntry, ProfileActivity, RawLinkedInCompany,
    RawLinkedInProfile,
};
use crate::linkedin::ProfileSource;

const LOGIN_URL: &str = "https://www.linkedin.com/login";
const FEED_URL: &str = "https://www.linkedin.com/feed/";
const HOME_URL: &str = "https://www.linkedin.com/";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct LinkedInCredentials {
    pub username: String,
    pub password: String,
}

struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

/// Session-authenticated LinkedIn scraper over a controlled browser.
///
/// The browser is configured to suppress automation fingerprints; login
/// replays persisted cookies when possible and otherwise types credentials
/// with human-paced delays. Field extraction is best-effort throughout: a
/// missing selector yields `None` for that field, and any stage-level failure
/// yields `None` for the whole scrape.
pub struct LinkedInScraper {
    credentials: LinkedInCredentials,
    config: LinkedInConfig,
    session: Option<BrowserSession>,
    logged_in: bool,
}

impl LinkedInScraper {
    pub fn new(credentials: LinkedInCredentials, config: LinkedInConfig) -> Self {
        Self {
            credentials,
            config,
            session: None,
            logged_in: false,
        }
    }

    async fn ensure_browser(&mut self) -> crate::models::Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let mut builder = BrowserConfig::builder()
            .window_size(1366, 768)
            .args(vec![
                "--disable-blink-features=AutomationControlled",
                "--disable-extensions",
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
            ]);
        if !self.config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build()?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;
        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        page.set_user_agent(USER_AGENT).await?;
        // Clear the one flag sites probe for first.
        let _ = page
            .evaluate("Object.defineProperty(navigator, 'webdriver', {get: () => undefined})")
            .await;

        self.session = Some(BrowserSession {
            browser,
            handler_task,
            page,
        });
        info!("Browser session started (headless: {})", self.config.headless);
        Ok(())
    }

    fn page(&self) -> Option<&Page> {
        self.session.as_ref().map(|s| &s.page)
    }

    async fn navigate(&self, url: &str) -> crate::models::Result<()> {
        let page = self.page().ok_or("browser not started")?;
        let timeout = Duration::from_secs(self.config.page_load_timeout_seconds);
        tokio::time::timeout(timeout, async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
        })
        .await
        .map_err(|_| format!("navigation to {} timed out", url))??;
        let _ = page
            .evaluate("Object.defineProperty(navigator, 'webdriver', {get: () => undefined})")
            .await;
        Ok(())
    }

    async fn current_url(&self) -> String {
        match self.page() {
            Some(page) => page.url().await.ok().flatten().unwrap_or_default(),
            None => String::new(),
        }
    }

    /// Randomized pause between navigation actions.
    async fn action_pause(&self) {
        let ms = fastrand::u64(self.config.action_pause_min_ms..=self.config.action_pause_max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Scrolls in randomized increments with randomized pauses until the page
    /// height stops growing or the iteration cap is hit, so lazy-loaded
    /// content has a chance to render.
    async fn human_scroll(&self, iterations: usize) {
        let Some(page) = self.page() else { return };
        let mut position: i64 = 0;
        for _ in 0..iterations {
            let step =
                fastrand::u32(self.config.scroll_pixel_min..=self.config.scroll_pixel_max) as i64;
            position += step;
            let _ = page
                .evaluate(format!("window.scrollTo(0, {});", position))
                .await;

            let pause =
                fastrand::u64(self.config.scroll_pause_min_ms..=self.config.scroll_pause_max_ms);
            tokio::time::sleep(Duration::from_millis(pause)).await;

            let height: i64 = match page.evaluate("document.body.scrollHeight").await {
                Ok(result) => result.into_value().unwrap_or(i64::MAX),
                Err(_) => break,
            };
            if position >= height {
                break;
            }
        }
    }

    /// Types a value one character at a time with randomized inter-keystroke
    /// delays.
    async fn type_slowly(&self, selector: &str, value: &str) -> crate::models::Result<()> {
        let page = self.page().ok_or("browser not started")?;
        let element = page.find_element(selector).await?;
        element.click().await?;
        let mut buffer = [0u8; 4];
        for ch in value.chars() {
            element.type_str(ch.encode_utf8(&mut buffer)).await?;
            tokio::time::sleep(Duration::from_millis(fastrand::u64(50..=150))).await;
        }
        Ok(())
    }

    async fn text_of(&self, selector: &str) -> Option<String> {
        let page = self.page()?;
        let element = page.find_element(selector).await.ok()?;
        let text = element.inner_text().await.ok()??;
        let trimmed = text.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    async fn attr_of(&self, selector: &str, attribute: &str) -> Option<String> {
        let page = self.page()?;
        let element = page.find_element(selector).await.ok()?;
        element.attribute(attribute).await.ok()?
    }

    /// Runs an in-page extraction script that returns `JSON.stringify(...)`
    /// output and deserializes it. Any failure is an extraction miss.
    async fn eval_json<T: DeserializeOwned>(&self, script: &str) -> Option<T> {
        let page = self.page()?;
        let raw: String = page.evaluate(script).await.ok()?.into_value().ok()?;
        serde_json::from_str(&raw).ok()
    }

    async fn page_title_name(&self) -> Option<String> {
        let page = self.page()?;
        let title = page.get_title().await.ok()??;
        let name = title.split('|').next()?.trim().to_string();
        (!name.is_empty()).then_some(name)
    }

    async fn replay_cookies(&self) -> bool {
        let Some(cookies) = load_cookies(&self.config.cookies_path).await else {
            return false;
        };
        let Some(page) = self.page() else { return false };

        if self.navigate(HOME_URL).await.is_err() {
            return false;
        }

        let params: Vec<CookieParam> = cookies.iter().map(to_cookie_param).collect();
        if let Err(e) = page.set_cookies(params).await {
            warn!("Could not replay session cookies: {}", e);
            return false;
        }

        if self.navigate(FEED_URL).await.is_err() {
            return false;
        }
        self.action_pause().await;
        self.current_url().await.contains("feed")
    }

    async fn persist_cookies(&self) {
        let Some(page) = self.page() else { return };
        match page.get_cookies().await {
            Ok(cookies) => {
                let stored: Vec<StoredCookie> = cookies
                    .into_iter()
                    .map(|c| StoredCookie {
                        name: c.name,
                        value: c.value,
                        domain: c.domain,
                        path: c.path,
                        secure: c.secure,
                        http_only: c.http_only,
                        expires: Some(c.expires),
                    })
                    .collect();
                if let Err(e) = save_cookies(&self.config.cookies_path, &stored).await {
                    warn!("Could not persist session cookies: {}", e);
                }
            }
            Err(e) => warn!("Could not read session cookies: {}", e),
        }
    }

    async fn form_login(&self) -> crate::models::Result<bool> {
        info!("Logging in to LinkedIn with credentials");
        self.navigate(LOGIN_URL).await?;
        self.action_pause().await;

        self.type_slowly("#username", &self.credentials.username).await?;
        tokio::time::sleep(Duration::from_millis(fastrand::u64(500..=1500))).await;
        self.type_slowly("#password", &self.credentials.password).await?;
        tokio::time::sleep(Duration::from_millis(fastrand::u64(500..=1500))).await;

        let page = self.page().ok_or("browser not started")?;
        page.find_element("button[type='submit']").await?.click().await?;
        tokio::time::sleep(Duration::from_millis(fastrand::u64(3000..=5000))).await;

        let landed = self.current_url().await;
        if landed.contains("feed") {
            return Ok(true);
        }

        // A checkpoint needs out-of-band resolution; wait once, bounded, and
        // re-check.
        if landed.contains("checkpoint") || landed.contains("security-verification") {
            warn!(
                "Security verification required; waiting {}s for manual resolution",
                self.config.checkpoint_wait_seconds
            );
            tokio::time::sleep(Duration::from_secs(self.config.checkpoint_wait_seconds)).await;
            if self.current_url().await.contains("feed") {
                return Ok(true);
            }
        }

        Ok(false)
    }

    async fn extract_company(&self, url: &str) -> RawLinkedInCompany {
        let name = match self.text_of(".org-top-card-summary__title").await {
            Some(name) => name,
            None => self.page_title_name().await.unwrap_or_default(),
        };

        let mut company = RawLinkedInCompany {
            name,
            url: url.to_string(),
            ..Default::default()
        };

        self.human_scroll(5).await;

        company.industry = self.text_of(".org-top-card-summary-info-list__info-item").await;
        company.website = self
            .attr_of("[data-test-id='about-us__website'] a", "href")
            .await;
        company.company_size = self.text_of("[data-test-id='about-us__size']").await;
        company.headquarters = self.text_of("[data-test-id='about-us__headquarters']").await;
        company.founded = self.text_of("[data-test-id='about-us__foundedOn']").await;
        company.description = self
            .text_of(".org-about-us-organization-description__text")
            .await;

        company.recent_updates = self
            .eval_json::<Vec<CompanyUpdate>>(
                r#"JSON.stringify(Array.from(document.querySelectorAll('.org-update-card')).slice(0, 5).map(card => ({
                    date: card.querySelector('.org-update-card__date')?.innerText?.trim() ?? null,
                    content: card.querySelector('.org-update-card__text')?.innerText?.trim() ?? '',
                    engagement: card.querySelector('.org-update-card__engagement')?.innerText?.trim() ?? null
                })).filter(u => u.content.length > 0))"#,
            )
            .await
            .unwrap_or_default();

        company
    }

    async fn extract_profile(&self, url: &str) -> RawLinkedInProfile {
        let name = match self.text_of(".pv-text-details__title").await {
            Some(name) => name,
            None => self.page_title_name().await.unwrap_or_default(),
        };

        let mut profile = RawLinkedInProfile {
            name,
            url: url.to_string(),
            ..Default::default()
        };

        self.human_scroll(7).await;

        profile.title = self.text_of(".pv-text-details__subtitle").await;
        if let Some(title) = &profile.title {
            if let Some((_, company)) = title.split_once(" at ") {
                profile.company = Some(company.trim().to_string());
            }
        }
        profile.location = self.text_of(".pv-text-details__location").await;
        profile.about = self.text_of("section.pv-about-section p").await;

        profile.experience = self
            .eval_json::<Vec<ExperienceEntry>>(
                r#"JSON.stringify(Array.from(document.querySelectorAll('#experience .pvs-list__item--line-separated')).slice(0, 3).map(item => ({
                    role: item.querySelector('.t-bold span')?.innerText?.trim() ?? '',
                    company: item.querySelector('.t-14.t-normal span')?.innerText?.trim() ?? '',
                    date_range: item.querySelector('.t-14.t-normal.t-black--light span')?.innerText?.trim() ?? null
                })).filter(e => e.role.length > 0))"#,
            )
            .await
            .unwrap_or_default();

        if let Some(page) = self.page() {
            let _ = page
                .evaluate("window.scrollTo(0, document.body.scrollHeight);")
                .await;
        }
        self.action_pause().await;

        profile.accomplishments = self
            .eval_json::<Vec<AccomplishmentGroup>>(
                r#"JSON.stringify(Array.from(document.querySelectorAll('.pv-accomplishments-block')).map(block => ({
                    category: block.querySelector('.pv-accomplishments-block__title')?.innerText?.trim() ?? '',
                    items: Array.from(block.querySelectorAll('.pv-accomplishments-block__list-item')).map(i => i.innerText.trim())
                })).filter(g => g.category.length > 0))"#,
            )
            .await
            .unwrap_or_default();

        // Recent activity lives on its own sub-view.
        let activity_url = format!("{}/recent-activity/", url.trim_end_matches('/'));
        if self.navigate(&activity_url).await.is_ok() {
            self.action_pause().await;
            self.human_scroll(3).await;
            profile.recent_activity = self
                .eval_json::<Vec<ProfileActivity>>(
                    r#"JSON.stringify(Array.from(document.querySelectorAll('.pv-recent-activity-detail__feed-item, .feed-shared-update-v2')).slice(0, 5).map(item => {
                        const counts = item.querySelector("[data-test-id='social-actions-counts']")?.innerText ?? '';
                        const likes = counts.match(/(\d+)/);
                        return {
                            date: item.querySelector('.feed-shared-actor__sub-description')?.innerText?.trim() ?? null,
                            content: item.querySelector('.feed-shared-update-v2__description')?.innerText?.trim() ?? '',
                            likes: likes ? parseInt(likes[1], 10) : null,
                            comments: null,
                            url: null
                        };
                    }).filter(a => a.content.length > 0))"#,
                )
                .await
                .unwrap_or_default();
        }

        let skills_url = format!("{}/details/skills/", url.trim_end_matches('/'));
        if self.navigate(&skills_url).await.is_ok() {
            self.action_pause().await;
            profile.skills = self
                .eval_json::<Vec<String>>(
                    r#"JSON.stringify(Array.from(document.querySelectorAll('.pv-skill-category-entity__name')).map(s => s.innerText.trim()).filter(s => s.length > 0))"#,
                )
                .await
                .unwrap_or_default();
        }

        let contact_url = format!("{}/overlay/contact-info/", url.trim_end_matches('/'));
        if self.navigate(&contact_url).await.is_ok() {
            self.action_pause().await;
            profile.contact_info = self
                .eval_json::<std::collections::BTreeMap<String, String>>(
                    r#"JSON.stringify(Object.fromEntries(Array.from(document.querySelectorAll('.artdeco-modal__content .pv-contact-info__ci-container')).map(item => {
                        const label = item.querySelector('.pv-contact-info__header')?.innerText?.trim()?.toLowerCase() ?? '';
                        const link = item.querySelector('.pv-contact-info__contact-link');
                        const value = link?.innerText?.trim() || link?.getAttribute('href') || '';
                        return [label, value];
                    }).filter(([label, value]) => label.length > 0 && value.length > 0)))"#,
                )
                .await
                .unwrap_or_default();
        }

        profile
    }
}

#[async_trait]
impl ProfileSource for LinkedInScraper {
    /// Attempts cookie replay first, then falls back to form login.
    async fn login(&mut self) -> bool {
        if self.logged_in {
            return true;
        }
        if let Err(e) = self.ensure_browser().await {
            error!("Could not start browser session: {}", e);
            return false;
        }

        if self.replay_cookies().await {
            info!("Logged in via persisted session cookies");
            self.logged_in = true;
            return true;
        }

        match self.form_login().await {
            Ok(true) => {
                info!("Logged in to LinkedIn");
                self.logged_in = true;
                self.persist_cookies().await;
                true
            }
            Ok(false) => {
                error!("LinkedIn login failed");
                false
            }
            Err(e) => {
                error!("Error during LinkedIn login: {}", e);
                false
            }
        }
    }

    async fn scrape_company(&mut self, url: &str) -> Option<RawLinkedInCompany> {
        info!("Scraping company page: {}", url);
        if !self.login().await {
            error!("Cannot scrape company: not logged in");
            return None;
        }

        if let Err(e) = self.navigate(url).await {
            warn!("Company navigation failed for {}: {}", url, e);
            return None;
        }
        self.action_pause().await;

        let company = self.extract_company(url).await;
        if company.name.is_empty() {
            warn!("Company page yielded no name: {}", url);
            return None;
        }
        debug!("Scraped company: {}", company.name);
        Some(company)
    }

    async fn scrape_profile(&mut self, url: &str) -> Option<RawLinkedInProfile> {
        info!("Scraping profile: {}", url);
        if !self.login().await {
            error!("Cannot scrape profile: not logged in");
            return None;
        }

        if let Err(e) = self.navigate(url).await {
            warn!("Profile navigation failed for {}: {}", url, e);
            return None;
        }
        self.action_pause().await;

        let profile = self.extract_profile(url).await;
        if profile.name.is_empty() {
            warn!("Profile page yielded no name: {}", url);
            return None;
        }
        debug!("Scraped profile: {}", profile.name);
        Some(profile)
    }

    async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.browser.close().await {
                warn!("Browser close failed: {}", e);
            }
            session.handler_task.abort();
            info!("Browser session closed");
        }
        self.logged_in = false;
    }
}

fn to_cookie_param(cookie: &StoredCookie) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = Some(cookie.domain.clone());
    param.path = Some(cookie.path.clone());
    param.secure = Some(cookie.secure);
    param.http_only = Some(cookie.http_only);
    param.url = Some(HOME_URL.to_string());
    param
}
