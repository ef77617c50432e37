//! Page fetch contract.

use std::future::Future;
use std::pin::Pin;

use crate::error::FetchError;

/// Future returned by a [`FetchSource`].
pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, FetchError>>>>;

/// Retrieves one page of items.
///
/// An empty page means "no more data right now". It stops the automatic
/// viewport-fill loop but does not stop later scroll-triggered fetches.
pub trait FetchSource<T> {
    fn fetch_page(&self, page: usize, page_size: usize) -> FetchFuture<T>;
}

impl<T, F, Fut> FetchSource<T> for F
where
    F: Fn(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, FetchError>> + 'static,
{
    fn fetch_page(&self, page: usize, page_size: usize) -> FetchFuture<T> {
        Box::pin(self(page, page_size))
    }
}

/// Whether a fetch is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchPhase {
    #[default]
    Idle,
    Fetching,
}
