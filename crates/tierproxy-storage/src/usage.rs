use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tierproxy_common::time::now_rfc3339;

use crate::error::StorageError;

const HISTORY_CAP: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub provider: String,
    pub model: String,
    pub tier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketStats {
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl BucketStats {
    fn record(&mut self, input_tokens: u64, output_tokens: u64) {
        self.requests += 1;
        self.input_tokens += input_tokens;
        self.output_tokens += output_tokens;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub by_provider: HashMap<String, BucketStats>,
    pub by_model: HashMap<String, BucketStats>,
    pub by_tier: HashMap<String, BucketStats>,
    pub history: VecDeque<UsageRecord>,
}

/// Token usage counters by provider/model/tier plus a bounded history.
/// Serializes to `token_usage.json` on every `record`; the lock covers both
/// mutation and the disk write queue so readers always see a consistent
/// snapshot.
pub struct UsageTracker {
    path: PathBuf,
    state: Mutex<UsageStats>,
}

impl UsageTracker {
    pub async fn load(path: PathBuf) -> Result<Self, StorageError> {
        let stats = match tierproxy_common::fs::read_json::<UsageStats>(&path).await {
            Ok(stats) => stats.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(%err, "token_usage.json is corrupted, starting from empty counters");
                UsageStats::default()
            }
        };
        Ok(Self {
            path,
            state: Mutex::new(stats),
        })
    }

    pub fn snapshot(&self) -> UsageStats {
        self.state.lock().expect("usage lock poisoned").clone()
    }

    /// Appends a usage record and persists. Never fails the caller's request:
    /// a disk-write error is logged and swallowed.
    pub async fn record(&self, provider: &str, model: &str, tier: &str, input_tokens: u64, output_tokens: u64) {
        let snapshot = {
            let mut guard = self.state.lock().expect("usage lock poisoned");
            guard.total_requests += 1;
            guard.total_input_tokens += input_tokens;
            guard.total_output_tokens += output_tokens;
            guard
                .by_provider
                .entry(provider.to_string())
                .or_default()
                .record(input_tokens, output_tokens);
            guard
                .by_model
                .entry(model.to_string())
                .or_default()
                .record(input_tokens, output_tokens);
            guard
                .by_tier
                .entry(tier.to_string())
                .or_default()
                .record(input_tokens, output_tokens);

            guard.history.push_back(UsageRecord {
                timestamp: now_rfc3339(),
                input_tokens,
                output_tokens,
                provider: provider.to_string(),
                model: model.to_string(),
                tier: tier.to_string(),
            });
            while guard.history.len() > HISTORY_CAP {
                guard.history.pop_front();
            }
            guard.clone()
        };

        if let Err(err) = tierproxy_common::fs::write_json_atomic(&self.path, &snapshot).await {
            tracing::warn!(%err, "failed to persist token_usage.json");
        }
    }

    pub async fn reset(&self) -> Result<(), StorageError> {
        let empty = {
            let mut guard = self.state.lock().expect("usage lock poisoned");
            *guard = UsageStats::default();
            guard.clone()
        };
        tierproxy_common::fs::write_json_atomic(&self.path, &empty).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_is_capped_and_total_requests_tracks_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = UsageTracker::load(dir.path().join("token_usage.json")).await.unwrap();
        for i in 0..150 {
            tracker.record("anthropic", "claude-haiku", "haiku", i, i).await;
        }
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_requests, 150);
        assert_eq!(snapshot.history.len(), 100);
    }

    #[tokio::test]
    async fn reset_zeroes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = UsageTracker::load(dir.path().join("token_usage.json")).await.unwrap();
        tracker.record("glm", "glm-4.7", "sonnet", 10, 20).await;
        tracker.reset().await.unwrap();
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert!(snapshot.history.is_empty());
        assert!(snapshot.by_provider.is_empty());
    }

    #[tokio::test]
    async fn corrupted_file_on_load_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        let tracker = UsageTracker::load(path).await.unwrap();
        assert_eq!(tracker.snapshot().total_requests, 0);
    }

    #[tokio::test]
    async fn persistence_round_trip_preserves_semantics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token_usage.json");
        {
            let tracker = UsageTracker::load(path.clone()).await.unwrap();
            tracker.record("openrouter", "model-x", "opus", 5, 7).await;
        }
        let reloaded = UsageTracker::load(path).await.unwrap();
        let snapshot = reloaded.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.total_input_tokens, 5);
        assert_eq!(snapshot.total_output_tokens, 7);
    }
}
