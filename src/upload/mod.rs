//! Chunked upload of text blobs into a key-value store.
//!
//! Input files are concatenated, cut into size-limited parts at blank lines,
//! and written sequentially. Throttled writes are retried with exponential
//! backoff plus random jitter; any other failure aborts the upload.

pub mod chunker;
pub mod store;

pub use chunker::{PART_SEPARATOR, chunk_data, concat_files};
pub use store::{DynamoStore, KvStore, PartItem, StoreError};

use rand::Rng;
use std::time::Duration;

use crate::config::UploadConfig;
use crate::error::{AispecError, Result};

/// Exponential backoff with uniform jitter
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Total attempts per part
    pub max_retries: u32,
    pub base: Duration,
    pub jitter_min_ms: u64,
    pub jitter_max_ms: u64,
}

impl BackoffPolicy {
    /// `base * 2^retry` plus a random jitter
    pub fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        let jitter = if self.jitter_max_ms > self.jitter_min_ms {
            rand::thread_rng().gen_range(self.jitter_min_ms..=self.jitter_max_ms)
        } else {
            self.jitter_min_ms
        };
        self.base.saturating_mul(factor) + Duration::from_millis(jitter)
    }
}

impl From<&UploadConfig> for BackoffPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base: Duration::from_millis(config.backoff_base_ms),
            jitter_min_ms: config.jitter_min_ms,
            jitter_max_ms: config.jitter_max_ms,
        }
    }
}

/// Parts written by one upload
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Stored data paths in write order
    pub parts: Vec<String>,
    pub bytes: usize,
    pub throttled: u32,
}

pub struct Uploader<S: KvStore> {
    store: S,
    policy: BackoffPolicy,
}

impl<S: KvStore> Uploader<S> {
    pub fn new(store: S, policy: BackoffPolicy) -> Self {
        Self { store, policy }
    }

    /// Write every chunk as `<data_path>_part<N>`, N starting at 1.
    pub async fn upload(
        &self,
        project_path: &str,
        data_path: &str,
        chunks: Vec<String>,
    ) -> Result<UploadReport> {
        let mut report = UploadReport::default();

        for (idx, chunk) in chunks.into_iter().enumerate() {
            let part = idx + 1;
            let bytes = chunk.len();
            let item = PartItem::new(project_path, data_path, part, chunk);

            report.throttled += self.put_with_backoff(&item).await?;
            log::info!("Part {} written successfully ({} bytes)", part, bytes);
            report.bytes += bytes;
            report.parts.push(item.data_path);
        }

        Ok(report)
    }

    /// Returns how many throttled attempts preceded the successful write.
    async fn put_with_backoff(&self, item: &PartItem) -> Result<u32> {
        let max_attempts = self.policy.max_retries.max(1);
        let mut retries = 0;

        loop {
            match self.store.put_part(item).await {
                Ok(()) => return Ok(retries),
                Err(StoreError::Throttled(msg)) => {
                    retries += 1;
                    if retries >= max_attempts {
                        return Err(AispecError::Upload(format!(
                            "{} still throttled after {} attempts: {}",
                            item.data_path, retries, msg
                        )));
                    }
                    let wait = self.policy.delay(retries - 1);
                    log::warn!(
                        "{} throttled, waiting for {:.3} seconds...",
                        item.data_path,
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(StoreError::Other(msg)) => {
                    return Err(AispecError::Upload(format!(
                        "Error writing {}: {}",
                        item.data_path, msg
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// In-memory store that throttles the first `throttle` writes
    struct ScriptedStore {
        throttle: AtomicU32,
        fail_with_other: bool,
        written: Mutex<Vec<PartItem>>,
    }

    impl ScriptedStore {
        fn new(throttle: u32) -> Self {
            Self {
                throttle: AtomicU32::new(throttle),
                fail_with_other: false,
                written: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl KvStore for ScriptedStore {
        async fn put_part(&self, item: &PartItem) -> std::result::Result<(), StoreError> {
            if self.fail_with_other {
                return Err(StoreError::Other("access denied".to_string()));
            }
            if self.throttle.load(Ordering::SeqCst) > 0 {
                self.throttle.fetch_sub(1, Ordering::SeqCst);
                return Err(StoreError::Throttled("capacity".to_string()));
            }
            self.written.lock().unwrap().push(item.clone());
            Ok(())
        }
    }

    fn instant_policy(max_retries: u32) -> BackoffPolicy {
        BackoffPolicy {
            max_retries,
            base: Duration::ZERO,
            jitter_min_ms: 0,
            jitter_max_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_parts_are_numbered_from_one() {
        let uploader = Uploader::new(ScriptedStore::new(0), instant_policy(8));
        let report = uploader
            .upload("proj", "spec", vec!["a".to_string(), "bb".to_string()])
            .await
            .unwrap();

        assert_eq!(report.parts, vec!["spec_part1", "spec_part2"]);
        assert_eq!(report.bytes, 3);
        let written = uploader.store.written.lock().unwrap();
        assert_eq!(written[1].data, "bb");
        assert_eq!(written[0].project_path, "proj");
    }

    #[tokio::test]
    async fn test_throttling_is_retried() {
        let uploader = Uploader::new(ScriptedStore::new(3), instant_policy(8));
        let report = uploader.upload("p", "d", vec!["x".to_string()]).await.unwrap();
        assert_eq!(report.throttled, 3);
        assert_eq!(report.parts.len(), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let uploader = Uploader::new(ScriptedStore::new(10), instant_policy(4));
        let err = uploader.upload("p", "d", vec!["x".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("after 4 attempts"));
        assert!(uploader.store.written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_abort() {
        let mut store = ScriptedStore::new(0);
        store.fail_with_other = true;
        let uploader = Uploader::new(store, instant_policy(8));
        let err = uploader.upload("p", "d", vec!["x".to_string()]).await.unwrap_err();
        assert!(matches!(err, AispecError::Upload(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_backoff_delay_grows_with_jitter_in_range() {
        let policy = BackoffPolicy {
            max_retries: 8,
            base: Duration::from_secs(1),
            jitter_min_ms: 3000,
            jitter_max_ms: 10000,
        };
        for retry in 0..4 {
            let delay = policy.delay(retry);
            let floor = Duration::from_secs(1 << retry) + Duration::from_millis(3000);
            let ceiling = Duration::from_secs(1 << retry) + Duration::from_millis(10000);
            assert!(delay >= floor && delay <= ceiling, "retry {}: {:?}", retry, delay);
        }
    }
}
