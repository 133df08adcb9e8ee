// src/crawler/crawler.rs
use chrono::Utc;
use scraper::Html;
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::CrawlerConfig;
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::types::RawWebsiteData;
use crate::http_client::RateLimitedHttpClient;

const SUMMARY_MAX_CHARS: usize = 1000;

/// Breadth-limited crawl of a company domain. Contact-looking URLs jump the
/// frontier so a contact page is found within the page budget. Per-page
/// failures are counted and skipped; the crawl as a whole never fails.
pub struct WebsiteCrawler {
    http: RateLimitedHttpClient,
    extractor: ContentExtractor,
    max_pages: usize,
    max_depth: usize,
}

/// Output of one page worth of synchronous HTML processing. Kept separate so
/// the parsed document never lives across an await point.
struct PageExtract {
    text: String,
    emails: Vec<String>,
    phones: Vec<String>,
    technologies: Vec<String>,
    is_contact_page: bool,
    links: Vec<String>,
}

impl WebsiteCrawler {
    pub fn new(http: RateLimitedHttpClient, config: &CrawlerConfig) -> Self {
        Self {
            http,
            extractor: ContentExtractor::new(),
            max_pages: config.max_pages,
            max_depth: config.max_depth,
        }
    }

    /// Crawls with the configured page/depth budget.
    pub async fn crawl(&self, root_url: &str) -> RawWebsiteData {
        self.crawl_bounded(root_url, self.max_pages, self.max_depth).await
    }

    pub async fn crawl_bounded(
        &self,
        root_url: &str,
        max_pages: usize,
        max_depth: usize,
    ) -> RawWebsiteData {
        let normalized = normalize_url(root_url);
        let base = match Url::parse(&normalized) {
            Ok(url) => url,
            Err(e) => {
                warn!("Unusable root URL {}: {}", root_url, e);
                let mut result = RawWebsiteData::empty(root_url, "");
                result.page_errors = 1;
                return result;
            }
        };
        let domain = base.host_str().unwrap_or("").to_string();

        info!("🕷️ Starting crawl of {} (domain: {})", normalized, domain);

        let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
        frontier.push_back((normalized.clone(), 0));
        let mut visited: HashSet<String> = HashSet::new();

        let mut all_text: Vec<String> = Vec::new();
        let mut emails: Vec<String> = Vec::new();
        let mut phones: Vec<String> = Vec::new();
        let mut technologies: Vec<String> = Vec::new();
        let mut contact_urls: Vec<String> = Vec::new();
        let mut social_profiles: BTreeMap<String, String> = BTreeMap::new();
        let mut page_count = 0usize;
        let mut page_errors = 0usize;

        while let Some((url, depth)) = frontier.pop_front() {
            if page_count >= max_pages {
                break;
            }
            if !visited.insert(url.clone()) {
                continue;
            }

            let body = match self.fetch_page(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", url, e);
                    page_errors += 1;
                    continue;
                }
            };

            let extract = self.process_page(&body, &url, &base, &mut social_profiles);
            page_count += 1;
            debug!("Scraped page {}/{}: {}", page_count, max_pages, url);

            all_text.push(extract.text);
            emails.extend(extract.emails);
            phones.extend(extract.phones);
            technologies.extend(extract.technologies);
            if extract.is_contact_page {
                contact_urls.push(url.clone());
            }

            if depth < max_depth {
                for link in extract.links {
                    if visited.contains(&link) {
                        continue;
                    }
                    if link.to_lowercase().contains("contact") {
                        frontier.push_front((link, depth + 1));
                    } else {
                        frontier.push_back((link, depth + 1));
                    }
                }
            }
        }

        let combined_text = all_text.join(" ");
        let result = RawWebsiteData {
            scraped_url: normalized,
            domain,
            text_snippet: self.extractor.summarize_text(&combined_text, SUMMARY_MAX_CHARS),
            emails: dedup_preserving_order(emails),
            phones: dedup_preserving_order(phones),
            contact_form_url: contact_urls.first().cloned(),
            all_contact_urls: dedup_preserving_order(contact_urls),
            social_profiles,
            technologies_detected: dedup_preserving_order(technologies),
            crawled_page_count: page_count,
            page_errors,
            raw_text_length: combined_text.len(),
            scraped_at: Utc::now(),
        };

        info!(
            "Crawl complete for {}: {} pages ({} errors), {} emails, {} phones, {} contact pages",
            result.scraped_url,
            result.crawled_page_count,
            result.page_errors,
            result.emails.len(),
            result.phones.len(),
            result.all_contact_urls.len()
        );

        result
    }

    async fn fetch_page(&self, url: &str) -> crate::models::Result<String> {
        let response = self.http.get(url, &[]).await?;
        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn process_page(
        &self,
        body: &str,
        url: &str,
        base: &Url,
        social_profiles: &mut BTreeMap<String, String>,
    ) -> PageExtract {
        let document = Html::parse_document(body);

        let text = self.extractor.extract_clean_text(&document);
        let emails = self.extractor.extract_emails(&text);
        let phones = self.extractor.extract_phones(&text);
        let technologies = self.extractor.detect_technologies(body, &document);
        let is_contact_page = self.extractor.is_contact_page(url, &document);
        self.extractor.extract_social_links(&document, social_profiles);
        let links = self.extractor.extract_internal_links(&document, base);

        PageExtract {
            text,
            emails,
            phones,
            technologies,
            is_contact_page,
            links,
        }
    }
}

fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn crawler(max_pages: usize) -> WebsiteCrawler {
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
        WebsiteCrawler::new(
            http,
            &CrawlerConfig {
                max_pages,
                max_depth: 2,
                timeout_seconds: 5,
                user_agent: "test-agent".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn crawl_follows_links_and_deduplicates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><body>
                    <p>Acme builds rockets. Write to sales@acme.com.</p>
                    <a href="{0}/contact">Contact</a>
                    <a href="{0}/about">About</a>
                </body></html>"#,
                server.uri()
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contact"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><body><h1>Contact us</h1>
                    <p>sales@acme.com or call (415) 555-0134</p>
                </body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><p>About Acme</p></body></html>",
            ))
            .mount(&server)
            .await;

        let result = crawler(10).crawl(&server.uri()).await;

        assert_eq!(result.crawled_page_count, 3);
        assert_eq!(result.page_errors, 0);
        // sales@acme.com appears on two pages but must be reported once.
        assert_eq!(result.emails, vec!["sales@acme.com"]);
        assert_eq!(result.phones, vec!["4155550134"]);
        assert!(result.contact_form_url.as_deref().unwrap().ends_with("/contact"));
    }

    #[tokio::test]
    async fn contact_pages_jump_the_frontier() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><body>
                    <a href="{0}/a">A</a>
                    <a href="{0}/b">B</a>
                    <a href="{0}/contact">Contact</a>
                </body></html>"#,
                server.uri()
            )))
            .mount(&server)
            .await;
        for p in ["/a", "/b"] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string("<html><body>x</body></html>"),
                )
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/contact"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><h1>Contact us</h1></body></html>",
            ))
            .mount(&server)
            .await;

        // Budget of two pages: root plus exactly one link. The contact link
        // was discovered last but must be fetched first.
        let result = crawler(2).crawl(&server.uri()).await;
        assert_eq!(result.crawled_page_count, 2);
        assert!(result.contact_form_url.is_some());
    }

    #[tokio::test]
    async fn page_failures_do_not_fail_the_crawl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><body><p>info@acme.com</p><a href="{0}/gone">gone</a></body></html>"#,
                server.uri()
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = crawler(10).crawl(&server.uri()).await;
        assert_eq!(result.crawled_page_count, 1);
        assert_eq!(result.page_errors, 1);
        assert_eq!(result.emails, vec!["info@acme.com"]);
    }

    #[tokio::test]
    async fn unusable_root_url_yields_empty_result() {
        let result = crawler(10).crawl("not a url at all").await;
        assert_eq!(result.crawled_page_count, 0);
        assert_eq!(result.page_errors, 1);
    }
}
