//! Batch fetch orchestration: cache partition, fan-out, fan-in
//!
//! [`BatchFetchOrchestrator::fetch_all`] takes a set of identifiers, answers
//! the cached ones from its [`KeyedCache`], spawns one retrieval task per
//! missing key, and waits until every spawned task has reported before
//! returning.
//!
//! Failure policy: any failed retrieval fails the whole batch with a
//! [`BatchFailure`], but every retrieval that succeeded has already been
//! written to the cache. Re-issuing the same batch only re-fetches the keys
//! that failed, so repeated calls converge on success.

use crate::cache::{CacheConfig, Identifier, KeyedCache};
use crate::error::{BatchFailure, BatchResult, FetchError, Result};
use crate::fetch::RemoteFetcher;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Result of one spawned retrieval
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<V> {
    Success { key: Identifier, value: V },
    Failure { key: Identifier, error: FetchError },
}

impl<V> FetchOutcome<V> {
    pub fn key(&self) -> &str {
        match self {
            FetchOutcome::Success { key, .. } | FetchOutcome::Failure { key, .. } => key,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Counters describing what the orchestrator has done so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStats {
    /// Calls to `fetch_all`
    pub batches: u64,

    /// Batches answered entirely from cache, without spawning a task
    pub fast_path_batches: u64,

    /// Retrieval tasks spawned across all batches
    pub tasks_spawned: u64,

    /// Batches that reported an aggregate failure
    pub failed_batches: u64,
}

#[derive(Default)]
struct Counters {
    batches: AtomicU64,
    fast_path_batches: AtomicU64,
    tasks_spawned: AtomicU64,
    failed_batches: AtomicU64,
}

/// Fan-out/fan-in fetcher over a shared [`KeyedCache`]
pub struct BatchFetchOrchestrator<V, F> {
    cache: KeyedCache<Identifier, V>,
    fetcher: Arc<F>,

    /// Caps concurrent retrievals when `max_concurrency` is configured; shared by every batch
    limiter: Option<Arc<Semaphore>>,

    counters: Arc<Counters>,
}

impl<V, F> BatchFetchOrchestrator<V, F>
where
    V: Clone + Send + Sync + 'static,
    F: RemoteFetcher<V> + 'static,
{
    /// Create an orchestrator with an empty cache and unbounded fan-out
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, &CacheConfig::default())
    }

    /// Create an orchestrator with an empty cache sized by `config`
    pub fn with_config(fetcher: F, config: &CacheConfig) -> Self {
        Self::with_cache(KeyedCache::with_config(config), fetcher, config)
    }

    /// Create an orchestrator over an existing cache
    ///
    /// Lets a composition root share one cache between the orchestrator and
    /// other readers.
    pub fn with_cache(cache: KeyedCache<Identifier, V>, fetcher: F, config: &CacheConfig) -> Self {
        let limiter = config
            .max_concurrency
            .map(|max| Arc::new(Semaphore::new(max.max(1))));

        Self {
            cache,
            fetcher: Arc::new(fetcher),
            limiter,
            counters: Arc::new(Counters::default()),
        }
    }

    /// The cache this orchestrator reads from and writes to
    pub fn cache(&self) -> &KeyedCache<Identifier, V> {
        &self.cache
    }

    /// Fetch every value in `keys`, from cache where possible
    ///
    /// Duplicate identifiers are fetched once. The returned values are in no
    /// particular order. When nothing is missing from the cache the call
    /// returns without spawning any task.
    ///
    /// On failure, [`BatchFailure::first_error`] is whichever failure was
    /// observed first; with several failing keys it is not stable across runs.
    /// Dropping the returned future does not cancel retrievals already spawned;
    /// they still complete and populate the cache.
    pub async fn fetch_all<I, S>(&self, keys: I) -> BatchResult<V>
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        let unique: HashSet<Identifier> = keys.into_iter().map(Into::into).collect();
        let requested = unique.len();
        self.counters.batches.fetch_add(1, Ordering::Relaxed);

        let (mut values, misses) = self.cache.partition(unique).await;

        if misses.is_empty() {
            self.counters
                .fast_path_batches
                .fetch_add(1, Ordering::Relaxed);
            debug!("All {} requested keys served from cache", requested);
            return Ok(values);
        }

        info!(
            "Fetching {} of {} requested keys ({} cached)",
            misses.len(),
            requested,
            values.len()
        );

        // Fan-in completes only once every spawned retrieval has reported
        let mut pending: FuturesUnordered<_> =
            misses.into_iter().map(|key| self.spawn_fetch(key)).collect();

        let mut first_error: Option<FetchError> = None;
        let mut failure_count = 0usize;

        while let Some(outcome) = pending.next().await {
            match outcome {
                FetchOutcome::Success { value, .. } => values.push(value),
                FetchOutcome::Failure { key, error } => {
                    warn!("Fetch failed for {}: {}", key, error);
                    failure_count += 1;
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        match first_error {
            None => {
                debug!("Batch complete: {} values", values.len());
                Ok(values)
            }
            Some(error) => {
                self.counters.failed_batches.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Batch failed: {} of {} keys failed, {} cached for retry",
                    failure_count,
                    requested,
                    values.len()
                );
                Err(BatchFailure::new(error, failure_count))
            }
        }
    }

    /// Fetch a single value with cache-aside semantics
    ///
    /// Runs on the caller's task; no retrieval task is spawned.
    pub async fn fetch_one(&self, key: &str) -> Result<V> {
        if let Some(value) = self.cache.get(key).await {
            return Ok(value);
        }

        debug!("Fetching single key: {}", key);
        let value = self.fetcher.fetch(key).await?;
        self.cache.set(key.to_string(), value.clone()).await;
        Ok(value)
    }

    pub fn stats(&self) -> OrchestratorStats {
        OrchestratorStats {
            batches: self.counters.batches.load(Ordering::Relaxed),
            fast_path_batches: self.counters.fast_path_batches.load(Ordering::Relaxed),
            tasks_spawned: self.counters.tasks_spawned.load(Ordering::Relaxed),
            failed_batches: self.counters.failed_batches.load(Ordering::Relaxed),
        }
    }

    /// Spawn the retrieval for `key` and return a future for its outcome
    ///
    /// The spawned task writes a successful value into the cache itself, so
    /// the write happens even if nobody awaits the outcome.
    fn spawn_fetch(&self, key: Identifier) -> impl Future<Output = FetchOutcome<V>> {
        let cache = self.cache.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let limiter = self.limiter.clone();
        let task_key = key.clone();

        self.counters.tasks_spawned.fetch_add(1, Ordering::Relaxed);

        let handle = tokio::spawn(async move {
            let _permit = match limiter {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            match fetcher.fetch(&task_key).await {
                Ok(value) => {
                    cache.set(task_key.clone(), value.clone()).await;
                    FetchOutcome::Success {
                        key: task_key,
                        value,
                    }
                }
                Err(error) => FetchOutcome::Failure {
                    key: task_key,
                    error,
                },
            }
        });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => FetchOutcome::Failure {
                    error: FetchError::TaskFailed {
                        key: key.clone(),
                        reason: join_error.to_string(),
                    },
                    key,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fetcher_fn;
    use std::sync::atomic::AtomicUsize;

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
    ) -> impl RemoteFetcher<String> + 'static {
        fetcher_fn(move |key: Identifier| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, FetchError>(format!("value-{}", key))
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_all_populates_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = BatchFetchOrchestrator::new(counting_fetcher(calls.clone()));

        let mut values = orchestrator.fetch_all(["a", "b"]).await.unwrap();
        values.sort();

        assert_eq!(values, vec!["value-a", "value-b"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(orchestrator.cache().contains_key("a").await);
        assert!(orchestrator.cache().contains_key("b").await);
    }

    #[tokio::test]
    async fn test_fast_path_spawns_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = BatchFetchOrchestrator::new(counting_fetcher(calls.clone()));
        orchestrator.cache().set("a".to_string(), "cached".to_string()).await;

        let values = orchestrator.fetch_all(["a"]).await.unwrap();

        assert_eq!(values, vec!["cached"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let stats = orchestrator.stats();
        assert_eq!(stats.tasks_spawned, 0);
        assert_eq!(stats.fast_path_batches, 1);
    }

    #[tokio::test]
    async fn test_empty_key_set_is_fast_path() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = BatchFetchOrchestrator::new(counting_fetcher(calls.clone()));

        let values = orchestrator.fetch_all(Vec::<String>::new()).await.unwrap();

        assert!(values.is_empty());
        assert_eq!(orchestrator.stats().fast_path_batches, 1);
    }

    #[tokio::test]
    async fn test_fetch_one_uses_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = BatchFetchOrchestrator::new(counting_fetcher(calls.clone()));

        assert_eq!(orchestrator.fetch_one("x").await.unwrap(), "value-x");
        assert_eq!(orchestrator.fetch_one("x").await.unwrap(), "value-x");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(orchestrator.stats().tasks_spawned, 0);
    }

    #[tokio::test]
    async fn test_fetch_one_failure_leaves_cache_empty() {
        let orchestrator = BatchFetchOrchestrator::new(fetcher_fn(|key: Identifier| async move {
            Err::<String, _>(FetchError::NotFound(key))
        }));

        let result = orchestrator.fetch_one("gone").await;

        assert_eq!(result, Err(FetchError::NotFound("gone".to_string())));
        assert!(orchestrator.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_panicking_fetch_reports_task_failure() {
        let orchestrator = BatchFetchOrchestrator::new(fetcher_fn(|key: Identifier| async move {
            if key == "boom" {
                panic!("decoder exploded");
            }
            Ok::<_, FetchError>(key)
        }));

        let failure = orchestrator.fetch_all(["ok", "boom"]).await.unwrap_err();

        assert_eq!(failure.failure_count, 1);
        assert!(matches!(
            failure.first_error,
            FetchError::TaskFailed { ref key, .. } if key == "boom"
        ));
        assert!(orchestrator.cache().contains_key("ok").await);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok: FetchOutcome<u32> = FetchOutcome::Success {
            key: "a".to_string(),
            value: 1,
        };
        let err: FetchOutcome<u32> = FetchOutcome::Failure {
            key: "b".to_string(),
            error: FetchError::NotFound("b".to_string()),
        };

        assert!(ok.is_success());
        assert!(!err.is_success());
        assert_eq!(ok.key(), "a");
        assert_eq!(err.key(), "b");
    }
}
