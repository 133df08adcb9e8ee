// src/crawler/extractor.rs
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// Page-level extraction: emails, phones, social links, technology
/// fingerprints and contact-page heuristics. Pure functions over fetched
/// HTML; no network access.
pub struct ContentExtractor {
    email_regex: Regex,
    phone_patterns: Vec<Regex>,
    social_patterns: Vec<(&'static str, Vec<Regex>)>,
    tech_patterns: Vec<(&'static str, Vec<Regex>)>,
}

const BINARY_EXTENSIONS: [&str; 10] = [
    ".jpg", ".jpeg", ".png", ".gif", ".pdf", ".zip", ".doc", ".docx", ".mp4", ".svg",
];

impl ContentExtractor {
    pub fn new() -> Self {
        let social_patterns = vec![
            (
                "linkedin",
                vec![
                    Regex::new(r"linkedin\.com/company/[\w\-]+").unwrap(),
                    Regex::new(r"linkedin\.com/in/[\w\-]+").unwrap(),
                ],
            ),
            (
                "twitter",
                vec![
                    Regex::new(r"twitter\.com/[\w\-]+").unwrap(),
                    Regex::new(r"x\.com/[\w\-]+").unwrap(),
                ],
            ),
            ("facebook", vec![Regex::new(r"facebook\.com/[\w\-]+").unwrap()]),
            ("instagram", vec![Regex::new(r"instagram\.com/[\w\-]+").unwrap()]),
            (
                "youtube",
                vec![
                    Regex::new(r"youtube\.com/channel/[\w\-]+").unwrap(),
                    Regex::new(r"youtube\.com/c/[\w\-]+").unwrap(),
                    Regex::new(r"youtube\.com/user/[\w\-]+").unwrap(),
                ],
            ),
            ("github", vec![Regex::new(r"github\.com/[\w\-]+").unwrap()]),
        ];

        let tech = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)).unwrap())
                .collect()
        };

        let tech_patterns = vec![
            ("WordPress", tech(&["wp-content", "wp-includes", "wp-json"])),
            ("React", tech(&["react", "reactjs"])),
            ("Angular", tech(&["ng-", "angular"])),
            ("Vue.js", tech(&["vuejs", r"vue\.js"])),
            ("Bootstrap", tech(&["bootstrap"])),
            ("jQuery", tech(&["jquery"])),
            ("Shopify", tech(&["shopify"])),
            ("Wix", tech(&[r"wix\.com", "wixstatic"])),
            ("Squarespace", tech(&["squarespace"])),
            ("Drupal", tech(&["drupal"])),
            ("Joomla", tech(&["joomla"])),
            ("Magento", tech(&["magento"])),
            ("Google Analytics", tech(&["google-analytics", "gtag", r"ga\.js"])),
            ("HubSpot", tech(&["hubspot", "hs-script"])),
            ("Salesforce", tech(&["salesforce", r"force\.com"])),
            ("Marketo", tech(&["marketo"])),
            ("Intercom", tech(&["intercom"])),
            ("Zendesk", tech(&["zendesk"])),
            ("Mailchimp", tech(&["mailchimp"])),
            ("Segment", tech(&[r"segment\.io", r"segment\.com"])),
            ("Hotjar", tech(&["hotjar"])),
            ("Google Tag Manager", tech(&["googletagmanager"])),
        ];

        Self {
            email_regex: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap(),
            phone_patterns: vec![
                Regex::new(r"\+\d{1,3}[-.\s]?\(?\d{1,4}\)?[-.\s]?\d{1,4}[-.\s]?\d{1,9}").unwrap(),
                Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap(),
            ],
            social_patterns,
            tech_patterns,
        }
    }

    /// Page text with script/style/nav/header/footer content stripped and
    /// whitespace collapsed.
    pub fn extract_clean_text(&self, document: &Html) -> String {
        const SKIPPED: [&str; 6] = ["script", "style", "header", "footer", "nav", "noscript"];

        let mut parts: Vec<&str> = Vec::new();
        for node in document.tree.nodes() {
            if let Some(text) = node.value().as_text() {
                let skipped = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map(|e| SKIPPED.contains(&e.name()))
                        .unwrap_or(false)
                });
                if !skipped {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        parts.push(trimmed);
                    }
                }
            }
        }

        parts.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn extract_emails(&self, text: &str) -> Vec<String> {
        self.email_regex
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Phone candidates normalized to digits (a leading + is preserved).
    /// Matches with fewer than 7 digits are discarded as noise.
    pub fn extract_phones(&self, text: &str) -> Vec<String> {
        let mut phones = Vec::new();
        for pattern in &self.phone_patterns {
            for m in pattern.find_iter(text) {
                let normalized: String = m
                    .as_str()
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '+')
                    .collect();
                let digit_count = normalized.chars().filter(|c| c.is_ascii_digit()).count();
                if digit_count >= 7 {
                    phones.push(normalized);
                }
            }
        }
        phones
    }

    /// First link found per platform wins; later matches are ignored.
    pub fn extract_social_links(&self, document: &Html, links: &mut BTreeMap<String, String>) {
        let selector = Selector::parse("a[href]").unwrap();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            for (platform, patterns) in &self.social_patterns {
                if links.contains_key(*platform) {
                    continue;
                }
                if patterns.iter().any(|p| p.is_match(href)) {
                    links.insert(platform.to_string(), href.to_string());
                }
            }
        }
    }

    /// Known third-party fingerprints matched against script sources, meta
    /// tags and the raw page source.
    pub fn detect_technologies(&self, html_source: &str, document: &Html) -> Vec<String> {
        let script_selector = Selector::parse("script[src]").unwrap();
        let meta_selector = Selector::parse("meta").unwrap();

        let mut haystacks: Vec<String> = document
            .select(&script_selector)
            .filter_map(|s| s.value().attr("src").map(|src| src.to_string()))
            .collect();
        haystacks.extend(document.select(&meta_selector).map(|m| m.html()));

        let mut found = Vec::new();
        for (tech, patterns) in &self.tech_patterns {
            let in_tags = patterns
                .iter()
                .any(|p| haystacks.iter().any(|h| p.is_match(h)));
            if in_tags || patterns.iter().any(|p| p.is_match(html_source)) {
                found.push(tech.to_string());
            }
        }
        debug!("Detected {} technologies", found.len());
        found
    }

    /// Heuristic combining URL keywords, headings, and form fields.
    pub fn is_contact_page(&self, url: &str, document: &Html) -> bool {
        const URL_KEYWORDS: [&str; 4] = ["contact", "about/contact", "reach-us", "get-in-touch"];
        const TEXT_KEYWORDS: [&str; 3] = ["contact", "reach us", "get in touch"];

        let url_lower = url.to_lowercase();
        if URL_KEYWORDS.iter().any(|k| url_lower.contains(k)) {
            return true;
        }

        let title_selector = Selector::parse("title").unwrap();
        if let Some(title) = document.select(&title_selector).next() {
            let title = title.text().collect::<String>().to_lowercase();
            if TEXT_KEYWORDS.iter().any(|k| title.contains(k)) {
                return true;
            }
        }

        let heading_selector = Selector::parse("h1, h2, h3").unwrap();
        for heading in document.select(&heading_selector) {
            let text = heading.text().collect::<String>().to_lowercase();
            if TEXT_KEYWORDS.iter().any(|k| text.contains(k)) {
                return true;
            }
        }

        let form_selector = Selector::parse("form").unwrap();
        let input_selector = Selector::parse("input").unwrap();
        for form in document.select(&form_selector) {
            let form_text = form.text().collect::<String>().to_lowercase();
            if ["contact", "message", "email us"]
                .iter()
                .any(|k| form_text.contains(k))
            {
                return true;
            }
            for input in form.select(&input_selector) {
                let input_type = input.value().attr("type").unwrap_or("").to_lowercase();
                let input_name = input.value().attr("name").unwrap_or("").to_lowercase();
                if input_type == "email" || input_name.contains("email") {
                    return true;
                }
            }
        }

        false
    }

    /// Same-host links worth following: http(s), not a binary asset, not an
    /// anchor or script pseudo-link.
    pub fn extract_internal_links(&self, document: &Html, base: &Url) -> Vec<String> {
        let selector = Selector::parse("a[href]").unwrap();
        let mut links = Vec::new();

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                continue;
            }
            if resolved.host_str() != base.host_str() {
                continue;
            }
            let path_lower = resolved.path().to_lowercase();
            if BINARY_EXTENSIONS.iter().any(|ext| path_lower.ends_with(ext)) {
                continue;
            }
            let mut cleaned = resolved;
            cleaned.set_fragment(None);
            links.push(cleaned.to_string());
        }

        links
    }

    /// Head summary, breaking at a sentence boundary when one falls in the
    /// final 30% of the window.
    pub fn summarize_text(&self, text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let shortened: String = text.chars().take(max_chars).collect();
        match shortened.rfind('.') {
            Some(last_period) if last_period as f64 > max_chars as f64 * 0.7 => {
                shortened[..=last_period].to_string()
            }
            _ => shortened,
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ContentExtractor {
        ContentExtractor::new()
    }

    #[test]
    fn extracts_and_lowercases_emails() {
        let emails = extractor().extract_emails("Reach Sales@Acme.com or ceo@acme.io today");
        assert_eq!(emails, vec!["sales@acme.com", "ceo@acme.io"]);
    }

    #[test]
    fn phones_normalize_to_digits_only() {
        let phones = extractor().extract_phones("Call (415) 555-0134 or +44 20 7946 0958");
        assert!(phones.contains(&"4155550134".to_string()));
        assert!(phones.iter().any(|p| p.starts_with("+44")));
        for phone in &phones {
            assert!(phone.chars().all(|c| c.is_ascii_digit() || c == '+'));
        }
    }

    #[test]
    fn short_digit_runs_are_not_phones() {
        let phones = extractor().extract_phones("Suite 120, floor 3");
        assert!(phones.is_empty());
    }

    #[test]
    fn first_social_link_per_platform_wins() {
        let html = Html::parse_document(
            r#"<a href="https://linkedin.com/company/acme">a</a>
               <a href="https://linkedin.com/company/other">b</a>
               <a href="https://x.com/acme">c</a>"#,
        );
        let mut links = BTreeMap::new();
        extractor().extract_social_links(&html, &mut links);
        assert_eq!(links["linkedin"], "https://linkedin.com/company/acme");
        assert_eq!(links["twitter"], "https://x.com/acme");
    }

    #[test]
    fn detects_technologies_from_script_src() {
        let source = r#"<html><head>
            <script src="/wp-content/themes/acme/app.js"></script>
            <script src="https://js.hs-script.com/embed.js"></script>
            </head><body></body></html>"#;
        let html = Html::parse_document(source);
        let techs = extractor().detect_technologies(source, &html);
        assert!(techs.contains(&"WordPress".to_string()));
        assert!(techs.contains(&"HubSpot".to_string()));
    }

    #[test]
    fn contact_page_detected_from_url_heading_and_form() {
        let ex = extractor();
        let plain = Html::parse_document("<html><body><h1>Products</h1></body></html>");
        assert!(ex.is_contact_page("https://acme.com/contact", &plain));
        assert!(!ex.is_contact_page("https://acme.com/pricing", &plain));

        let heading = Html::parse_document("<html><body><h2>Get in touch</h2></body></html>");
        assert!(ex.is_contact_page("https://acme.com/misc", &heading));

        let form = Html::parse_document(
            r#"<html><body><form><input type="email" name="your_email"></form></body></html>"#,
        );
        assert!(ex.is_contact_page("https://acme.com/misc", &form));
    }

    #[test]
    fn internal_links_stay_on_host_and_skip_assets() {
        let base = Url::parse("https://acme.com/").unwrap();
        let html = Html::parse_document(
            r#"<a href="/about">about</a>
               <a href="https://acme.com/team#lead">team</a>
               <a href="https://elsewhere.com/x">ext</a>
               <a href="/brochure.pdf">pdf</a>
               <a href="mailto:hi@acme.com">mail</a>"#,
        );
        let links = extractor().extract_internal_links(&html, &base);
        assert_eq!(
            links,
            vec!["https://acme.com/about", "https://acme.com/team"]
        );
    }

    #[test]
    fn summary_prefers_sentence_boundary() {
        let ex = extractor();
        let text = format!("{} End of sentence. Trailing fragment", "x".repeat(80));
        let summary = ex.summarize_text(&text, 100);
        assert!(summary.ends_with('.'));
        assert!(summary.len() <= 100);

        let short = ex.summarize_text("tiny", 100);
        assert_eq!(short, "tiny");
    }

    #[test]
    fn clean_text_strips_script_and_nav() {
        let html = Html::parse_document(
            r#"<html><body>
                <nav>Home About</nav>
                <p>Acme  builds rockets.</p>
                <script>var x = "secret";</script>
                <footer>copyright</footer>
            </body></html>"#,
        );
        let text = extractor().extract_clean_text(&html);
        assert_eq!(text, "Acme builds rockets.");
    }
}
