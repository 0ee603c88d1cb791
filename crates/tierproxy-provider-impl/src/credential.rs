use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tierproxy_common::time::now_ms;
use tokio::sync::Mutex;

const REFRESH_SKEW_MS: i64 = 5 * 60 * 1000;
const FAILURE_COOLDOWN_MS: i64 = 60 * 1000;
const REFRESH_TIMEOUT: Duration = Duration::from_secs(10);
const NEVER_FAILED: i64 = i64::MIN;
// matches oauth.py's refresh endpoint, not the console host
const OAUTH_TOKEN_URL: &str = "https://api.anthropic.com/v1/oauth/token";
const OAUTH_CLIENT_ID: &str = "9d1c250a-e61b-44d9-88ed-5944d1962f5e";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
struct OAuthSubObject {
    #[serde(rename = "accessToken", default)]
    access_token: String,
    #[serde(rename = "refreshToken", default)]
    refresh_token: String,
    #[serde(rename = "expiresAt", default)]
    expires_at: i64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
struct CredentialsFile {
    #[serde(rename = "claudeAiOauth", skip_serializing_if = "Option::is_none", default)]
    claude_ai_oauth: Option<OAuthSubObject>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("io error reading credentials file: {0}")]
    Io(#[from] std::io::Error),
    #[error("credentials file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Owns `~/.claude/.credentials.json` (or an overridden path): reads the
/// OAuth sub-object, refreshes it when within 5 minutes of expiry, and
/// rewrites the file preserving every sibling key that other tools store
/// there. Refresh is single-flight and cools down for 60s after a failure.
pub struct CredentialManager {
    path: PathBuf,
    refresh_lock: Mutex<()>,
    last_failure_ms: AtomicI64,
    http: wreq::Client,
}

impl CredentialManager {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            refresh_lock: Mutex::new(()),
            last_failure_ms: AtomicI64::new(NEVER_FAILED),
            http: crate::http_client::shared_client(),
        }
    }

    async fn read_file(&self) -> Result<Option<CredentialsFile>, CredentialError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns true iff the file exists and parses to a non-empty access
    /// token. Never triggers a refresh.
    pub async fn has_credentials(&self) -> bool {
        match self.read_file().await {
            Ok(Some(file)) => file
                .claude_ai_oauth
                .map(|oauth| !oauth.access_token.is_empty())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Returns a still-valid access token, refreshing at most once per cycle
    /// across concurrent callers. Returns `None` ("no token") if there are no
    /// credentials on disk, or if a refresh attempt failed within the last
    /// 60s cooldown window.
    pub async fn current_access_token(&self) -> Option<String> {
        let Some(file) = self.read_file().await.ok().flatten() else {
            return None;
        };
        let Some(oauth) = file.claude_ai_oauth.clone() else {
            return None;
        };

        if oauth.expires_at - now_ms() > REFRESH_SKEW_MS {
            return Some(oauth.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock.
        let Some(file) = self.read_file().await.ok().flatten() else {
            return None;
        };
        let Some(oauth) = file.claude_ai_oauth.clone() else {
            return None;
        };
        if oauth.expires_at - now_ms() > REFRESH_SKEW_MS {
            return Some(oauth.access_token);
        }

        let last_failure = self.last_failure_ms.load(Ordering::SeqCst);
        if last_failure != NEVER_FAILED && now_ms() - last_failure < FAILURE_COOLDOWN_MS {
            // Broken refresh endpoint: don't hammer it. Expired token is
            // still returned; upstream will surface the auth error.
            return Some(oauth.access_token);
        }

        match self.refresh(&oauth.refresh_token).await {
            Ok(refreshed) => {
                self.last_failure_ms.store(NEVER_FAILED, Ordering::SeqCst);
                let new_token = refreshed.access_token.clone();
                if let Err(err) = self.persist(file, refreshed).await {
                    tracing::warn!(%err, "failed to persist refreshed oauth credentials");
                }
                Some(new_token)
            }
            Err(err) => {
                tracing::warn!(%err, "oauth refresh failed");
                self.last_failure_ms.store(now_ms(), Ordering::SeqCst);
                None
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<OAuthSubObject, String> {
        let response = self
            .http
            .post(OAUTH_TOKEN_URL)
            .timeout(REFRESH_TIMEOUT)
            .json(&serde_json::json!({
                "grant_type": "refresh_token",
                "refresh_token": refresh_token,
                "client_id": OAUTH_CLIENT_ID,
            }))
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            return Err(format!("oauth token endpoint returned {}", response.status()));
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access_token: String,
            #[serde(default)]
            refresh_token: Option<String>,
            expires_in: i64,
        }

        let body: RefreshResponse = response.json().await.map_err(|err| err.to_string())?;
        Ok(OAuthSubObject {
            access_token: body.access_token,
            refresh_token: body.refresh_token.unwrap_or_else(|| refresh_token.to_string()),
            expires_at: now_ms() + body.expires_in * 1000,
            extra: Map::new(),
        })
    }

    async fn persist(
        &self,
        mut file: CredentialsFile,
        mut refreshed: OAuthSubObject,
    ) -> Result<(), CredentialError> {
        if let Some(existing) = file.claude_ai_oauth.take() {
            // Preserve sibling keys inside the oauth sub-object that this
            // system does not itself manage.
            for (key, value) in existing.extra {
                refreshed.extra.entry(key).or_insert(value);
            }
        }
        file.claude_ai_oauth = Some(refreshed);
        let bytes = serde_json::to_vec_pretty(&file)?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_credentials(path: &std::path::Path, access_token: &str, expires_at: i64) {
        let body = serde_json::json!({
            "claudeAiOauth": {
                "accessToken": access_token,
                "refreshToken": "rt-1",
                "expiresAt": expires_at,
            },
            "otherTool": {"keepMe": true},
        });
        tokio::fs::write(path, serde_json::to_vec_pretty(&body).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_returns_no_token() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CredentialManager::new(dir.path().join(".credentials.json"));
        assert_eq!(manager.current_access_token().await, None);
        assert!(!manager.has_credentials().await);
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        write_credentials(&path, "tok-1", now_ms() + 60 * 60 * 1000).await;
        let manager = CredentialManager::new(path);
        assert_eq!(manager.current_access_token().await.as_deref(), Some("tok-1"));
        assert!(manager.has_credentials().await);
    }

    #[tokio::test]
    async fn cooldown_returns_stale_token_without_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".credentials.json");
        write_credentials(&path, "expired-tok", now_ms() - 1000).await;
        let manager = CredentialManager::new(path);
        manager.last_failure_ms.store(now_ms(), Ordering::SeqCst);
        assert_eq!(manager.current_access_token().await.as_deref(), Some("expired-tok"));
    }
}
