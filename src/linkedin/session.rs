// src/linkedin/session.rs
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Browser-agnostic cookie snapshot persisted between runs so `login()` can
/// replay a previous session instead of re-authenticating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub expires: Option<f64>,
}

pub async fn save_cookies(path: &str, cookies: &[StoredCookie]) -> crate::models::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(cookies)?;
    tokio::fs::write(path, json).await?;
    debug!("Saved {} session cookies to {}", cookies.len(), path);
    Ok(())
}

/// Returns `None` when there is no usable cookie file; a corrupt file is
/// logged and treated the same way.
pub async fn load_cookies(path: &str) -> Option<Vec<StoredCookie>> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    match serde_json::from_str::<Vec<StoredCookie>>(&content) {
        Ok(cookies) if !cookies.is_empty() => {
            debug!("Loaded {} session cookies from {}", cookies.len(), path);
            Some(cookies)
        }
        Ok(_) => None,
        Err(e) => {
            warn!("Could not parse cookie file {}: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cookies_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let path = path.to_str().unwrap();

        let cookies = vec![StoredCookie {
            name: "li_at".to_string(),
            value: "token".to_string(),
            domain: ".linkedin.com".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            expires: Some(1_900_000_000.0),
        }];
        save_cookies(path, &cookies).await.unwrap();

        let loaded = load_cookies(path).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "li_at");
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_is_none() {
        assert!(load_cookies("/nonexistent/cookies.json").await.is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "not json").await.unwrap();
        assert!(load_cookies(path.to_str().unwrap()).await.is_none());
    }
}
