//! Incremental accumulation of a paginated listing

use crate::error::Result;
use crate::fetch::PageFetcher;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One fetched page and the cursor it was fetched at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub cursor: u32,
}

type SortFn<T> = Box<dyn Fn(&T, &T) -> CmpOrdering + Send + Sync>;

/// Append-only list built from successive pages
///
/// At most one page fetch is in flight at a time. A call made while another
/// is running returns `Ok(None)` immediately without fetching; it is not
/// queued. The cursor starts at 0 and advances by one per successful page.
pub struct PaginatedAccumulator<T, P> {
    fetcher: P,
    state: RwLock<AccumulatorState<T>>,
    loading: AtomicBool,
    sort_by: Option<SortFn<T>>,
}

struct AccumulatorState<T> {
    items: Vec<T>,
    cursor: u32,
}

/// Clears the loading flag when the fetch finishes, fails, or is dropped
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T, P> PaginatedAccumulator<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: PageFetcher<T>,
{
    pub fn new(fetcher: P) -> Self {
        Self {
            fetcher,
            state: RwLock::new(AccumulatorState {
                items: Vec::new(),
                cursor: 0,
            }),
            loading: AtomicBool::new(false),
            sort_by: None,
        }
    }

    /// Re-sort the whole accumulated list with `compare` after every page
    pub fn with_sort_by<C>(mut self, compare: C) -> Self
    where
        C: Fn(&T, &T) -> CmpOrdering + Send + Sync + 'static,
    {
        self.sort_by = Some(Box::new(compare));
        self
    }

    /// Fetch the page at the current cursor and append it
    ///
    /// Returns `Ok(None)` without fetching when another call is in flight.
    /// On failure the items and cursor are left unchanged.
    pub async fn fetch_next_page(&self) -> Result<Option<Page<T>>> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Page fetch already in flight, skipping");
            return Ok(None);
        }
        let _loading = LoadingGuard(&self.loading);

        let cursor = self.state.read().await.cursor;
        debug!("Fetching page {}", cursor);

        let items = match self.fetcher.fetch_page(cursor).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Page {} fetch failed: {}", cursor, e);
                return Err(e);
            }
        };

        let mut state = self.state.write().await;
        state.items.extend(items.iter().cloned());
        if let Some(compare) = &self.sort_by {
            state.items.sort_by(|a, b| compare(a, b));
        }
        state.cursor += 1;

        info!(
            "Loaded page {} ({} items, {} total)",
            cursor,
            items.len(),
            state.items.len()
        );

        Ok(Some(Page { items, cursor }))
    }

    /// Snapshot of every item accumulated so far
    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items.clone()
    }

    /// Index of the next page to fetch
    pub async fn cursor(&self) -> u32 {
        self.state.read().await.cursor
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }
}
