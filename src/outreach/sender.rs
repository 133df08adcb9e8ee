// src/outreach/sender.rs
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::{HttpClientError, SendError};
use crate::http_client::RateLimitedHttpClient;
use crate::models::EmailProvider;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";
const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

#[derive(Debug, Clone)]
pub struct SendRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub provider: EmailProvider,
    pub from_name: Option<String>,
}

/// Result object for one send attempt. Transport failures land here with
/// `success: false`; only request-time validation problems are `SendError`s.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub provider: EmailProvider,
    pub error: Option<String>,
}

/// Outbound email transport over the Gmail and Microsoft Graph REST APIs.
/// A provider without a configured token rejects at request time.
pub struct EmailSender {
    http: RateLimitedHttpClient,
    gmail_token: Option<String>,
    outlook_token: Option<String>,
    gmail_base: String,
    graph_base: String,
    delay_between_sends: Duration,
}

impl EmailSender {
    pub fn new(
        http: RateLimitedHttpClient,
        gmail_token: Option<String>,
        outlook_token: Option<String>,
        delay_between_sends_ms: u64,
    ) -> Self {
        Self {
            http,
            gmail_token,
            outlook_token,
            gmail_base: GMAIL_API_BASE.to_string(),
            graph_base: GRAPH_API_BASE.to_string(),
            delay_between_sends: Duration::from_millis(delay_between_sends_ms),
        }
    }

    #[cfg(test)]
    fn with_bases(mut self, gmail_base: &str, graph_base: &str) -> Self {
        self.gmail_base = gmail_base.trim_end_matches('/').to_string();
        self.graph_base = graph_base.trim_end_matches('/').to_string();
        self
    }

    pub async fn send(&self, request: &SendRequest) -> Result<SendOutcome, SendError> {
        match request.provider {
            EmailProvider::Gmail => self.send_gmail(request).await,
            EmailProvider::Outlook => self.send_outlook(request).await,
        }
    }

    /// Sends several drafts sequentially with jittered pacing between sends.
    pub async fn send_batch(&self, requests: &[SendRequest]) -> Vec<Result<SendOutcome, SendError>> {
        let mut results = Vec::with_capacity(requests.len());
        info!("Starting batch send of {} emails", requests.len());

        for (i, request) in requests.iter().enumerate() {
            results.push(self.send(request).await);
            if i + 1 < requests.len() {
                let jitter = Duration::from_millis(fastrand::u64(0..=1000));
                tokio::time::sleep(self.delay_between_sends + jitter).await;
            }
        }

        results
    }

    async fn send_gmail(&self, request: &SendRequest) -> Result<SendOutcome, SendError> {
        let token = self
            .gmail_token
            .as_ref()
            .ok_or_else(|| SendError::NotConfigured("gmail".to_string()))?;

        let mime = build_mime(request);
        let raw = URL_SAFE_NO_PAD.encode(mime.as_bytes());
        let url = format!("{}/users/me/messages/send", self.gmail_base);
        let headers = [("Authorization", format!("Bearer {}", token))];

        match self
            .http
            .post_json(&url, &headers, &json!({ "raw": raw }))
            .await
        {
            Ok(response) => {
                let payload: serde_json::Value = response.json().await.unwrap_or_default();
                let message_id = payload
                    .get("id")
                    .and_then(serde_json::Value::as_str)
                    .map(|s| s.to_string());
                info!(
                    "Email sent via Gmail to {} (message id: {:?})",
                    request.to, message_id
                );
                Ok(SendOutcome {
                    success: true,
                    message_id,
                    provider: EmailProvider::Gmail,
                    error: None,
                })
            }
            Err(e) => Ok(self.failed(EmailProvider::Gmail, &request.to, e)),
        }
    }

    async fn send_outlook(&self, request: &SendRequest) -> Result<SendOutcome, SendError> {
        let token = self
            .outlook_token
            .as_ref()
            .ok_or_else(|| SendError::NotConfigured("outlook".to_string()))?;

        let url = format!("{}/me/sendMail", self.graph_base);
        let headers = [("Authorization", format!("Bearer {}", token))];
        let body = json!({
            "message": {
                "subject": request.subject,
                "body": {
                    "contentType": "HTML",
                    "content": request.body,
                },
                "toRecipients": [
                    {"emailAddress": {"address": request.to}}
                ],
            },
            "saveToSentItems": true,
        });

        match self.http.post_json(&url, &headers, &body).await {
            Ok(_) => {
                info!("Email sent via Outlook to {}", request.to);
                // Graph sendMail returns 202 with no body; there is no
                // provider message id to record.
                Ok(SendOutcome {
                    success: true,
                    message_id: None,
                    provider: EmailProvider::Outlook,
                    error: None,
                })
            }
            Err(e) => Ok(self.failed(EmailProvider::Outlook, &request.to, e)),
        }
    }

    fn failed(&self, provider: EmailProvider, to: &str, e: HttpClientError) -> SendOutcome {
        error!("Send via {} to {} failed: {}", provider.as_str(), to, e);
        SendOutcome {
            success: false,
            message_id: None,
            provider,
            error: Some(e.to_string()),
        }
    }
}

/// RFC 2822 message for the Gmail raw-send endpoint.
fn build_mime(request: &SendRequest) -> String {
    let mut headers = String::new();
    if let Some(from_name) = &request.from_name {
        headers.push_str(&format!("From: {}\r\n", from_name));
    }
    headers.push_str(&format!("To: {}\r\n", request.to));
    headers.push_str(&format!("Subject: {}\r\n", request.subject));
    headers.push_str("MIME-Version: 1.0\r\n");
    headers.push_str("Content-Type: text/html; charset=\"UTF-8\"\r\n");
    format!("{}\r\n{}", headers, request.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> RateLimitedHttpClient {
        RateLimitedHttpClient::new(
            &HttpConfig {
                rate_limit_calls: 100,
                rate_limit_window_ms: 1000,
                max_retries: 0,
                retry_base_delay_ms: 1,
                timeout_seconds: 5,
            },
            "test-agent",
        )
        .unwrap()
    }

    fn request(provider: EmailProvider) -> SendRequest {
        SendRequest {
            to: "jo@acme.com".to_string(),
            subject: "Rockets".to_string(),
            body: "<p>Impressive launch cadence.</p>".to_string(),
            provider,
            from_name: Some("Sam Seller".to_string()),
        }
    }

    #[test]
    fn mime_message_carries_headers_and_body() {
        let mime = build_mime(&request(EmailProvider::Gmail));
        assert!(mime.contains("To: jo@acme.com\r\n"));
        assert!(mime.contains("Subject: Rockets\r\n"));
        assert!(mime.contains("From: Sam Seller\r\n"));
        assert!(mime.ends_with("<p>Impressive launch cadence.</p>"));

        // The raw encoding must round-trip.
        let raw = URL_SAFE_NO_PAD.encode(mime.as_bytes());
        let decoded = URL_SAFE_NO_PAD.decode(raw).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), mime);
    }

    #[tokio::test]
    async fn gmail_send_returns_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/messages/send"))
            .and(header("Authorization", "Bearer gmail-token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "msg_123"})),
            )
            .mount(&server)
            .await;

        let sender = EmailSender::new(http(), Some("gmail-token".to_string()), None, 0)
            .with_bases(&server.uri(), &server.uri());
        let outcome = sender.send(&request(EmailProvider::Gmail)).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message_id.as_deref(), Some("msg_123"));
    }

    #[tokio::test]
    async fn outlook_send_succeeds_without_message_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/sendMail"))
            .and(header("Authorization", "Bearer graph-token"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let sender = EmailSender::new(http(), None, Some("graph-token".to_string()), 0)
            .with_bases(&server.uri(), &server.uri());
        let outcome = sender.send(&request(EmailProvider::Outlook)).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.message_id.is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_is_a_request_error() {
        let sender = EmailSender::new(http(), None, None, 0);
        let err = sender.send(&request(EmailProvider::Gmail)).await.unwrap_err();
        assert!(matches!(err, SendError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn provider_rejection_is_a_failed_outcome_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/messages/send"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid recipient"))
            .mount(&server)
            .await;

        let sender = EmailSender::new(http(), Some("gmail-token".to_string()), None, 0)
            .with_bases(&server.uri(), &server.uri());
        let outcome = sender.send(&request(EmailProvider::Gmail)).await.unwrap();
        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("400"));
    }
}
