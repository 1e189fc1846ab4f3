//! Collaborator contracts for retrieving data from a remote source
//!
//! The orchestration in this crate never talks to the network directly. It
//! asks one of these traits for a single key, a single page, or the raw bytes
//! behind a resource locator, one attempt per call.

use crate::cache::Identifier;
use crate::error::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Retrieves one entity by identifier (network call + decode)
///
/// Implementations must tolerate concurrent calls for distinct keys.
#[async_trait]
pub trait RemoteFetcher<V>: Send + Sync
where
    V: Send + 'static,
{
    async fn fetch(&self, key: &str) -> Result<V>;
}

/// Retrieves one page of an ordered listing, pages counted from 0
#[async_trait]
pub trait PageFetcher<T>: Send + Sync
where
    T: Send + 'static,
{
    async fn fetch_page(&self, page: u32) -> Result<Vec<T>>;
}

/// Retrieves the encoded bytes of an image by resource locator
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>>;
}

#[async_trait]
impl<V, T> RemoteFetcher<V> for Arc<T>
where
    V: Send + 'static,
    T: RemoteFetcher<V> + ?Sized,
{
    async fn fetch(&self, key: &str) -> Result<V> {
        (**self).fetch(key).await
    }
}

#[async_trait]
impl<T, P> PageFetcher<T> for Arc<P>
where
    T: Send + 'static,
    P: PageFetcher<T> + ?Sized,
{
    async fn fetch_page(&self, page: u32) -> Result<Vec<T>> {
        (**self).fetch_page(page).await
    }
}

#[async_trait]
impl<S> ImageSource for Arc<S>
where
    S: ImageSource + ?Sized,
{
    async fn fetch_bytes(&self, locator: &str) -> Result<Vec<u8>> {
        (**self).fetch_bytes(locator).await
    }
}

/// [`RemoteFetcher`] backed by an async closure
pub struct FnFetcher<F> {
    f: F,
}

/// Wrap `f` so it can be handed to a [`BatchFetchOrchestrator`]
///
/// [`BatchFetchOrchestrator`]: crate::batch::BatchFetchOrchestrator
pub fn fetcher_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

#[async_trait]
impl<V, F, Fut> RemoteFetcher<V> for FnFetcher<F>
where
    V: Send + 'static,
    F: Fn(Identifier) -> Fut + Send + Sync,
    Fut: Future<Output = Result<V>> + Send,
{
    async fn fetch(&self, key: &str) -> Result<V> {
        (self.f)(key.to_string()).await
    }
}

/// [`PageFetcher`] backed by an async closure
pub struct FnPageFetcher<F> {
    f: F,
}

pub fn page_fetcher_fn<F>(f: F) -> FnPageFetcher<F> {
    FnPageFetcher { f }
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnPageFetcher<F>
where
    T: Send + 'static,
    F: Fn(u32) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>>> + Send,
{
    async fn fetch_page(&self, page: u32) -> Result<Vec<T>> {
        (self.f)(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[tokio::test]
    async fn test_fetcher_fn_passes_key() {
        let fetcher = fetcher_fn(|key: Identifier| async move {
            if key == "missing" {
                Err(FetchError::NotFound(key))
            } else {
                Ok(key.len())
            }
        });

        assert_eq!(fetcher.fetch("abc").await, Ok(3));
        assert!(matches!(
            fetcher.fetch("missing").await,
            Err(FetchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_page_fetcher_fn_passes_page() {
        let fetcher = page_fetcher_fn(|page: u32| async move { Ok::<_, FetchError>(vec![page, page + 1]) });

        assert_eq!(fetcher.fetch_page(4).await, Ok(vec![4, 5]));
    }
}
