//! Fetch sources for tests.

use futures::channel::oneshot;
use futures::future;
use scrollgrid::{FetchError, FetchFuture, FetchSource};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// `(page, page_size)` pairs in call order.
pub type FetchCalls = Vec<(usize, usize)>;

/// Replies with queued pages, then with empty pages once the queue runs out.
///
/// Pages resolve on the first poll.
pub struct ScriptedSource<T> {
    state: Rc<RefCell<ScriptState<T>>>,
}

struct ScriptState<T> {
    pages: VecDeque<Result<Vec<T>, FetchError>>,
    calls: FetchCalls,
}

impl<T> Clone for ScriptedSource<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> ScriptedSource<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ScriptState {
                pages: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn with_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = Vec<T>>,
    {
        let source = Self::new();
        for page in pages {
            source.push_page(page);
        }
        source
    }

    pub fn push_page(&self, page: Vec<T>) {
        self.state.borrow_mut().pages.push_back(Ok(page));
    }

    pub fn push_error(&self, message: impl Into<String>) {
        self.state
            .borrow_mut()
            .pages
            .push_back(Err(FetchError::new(message)));
    }

    pub fn calls(&self) -> FetchCalls {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.borrow().calls.len()
    }

    /// Replies not yet handed out.
    pub fn remaining(&self) -> usize {
        self.state.borrow().pages.len()
    }
}

impl<T: 'static> Default for ScriptedSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> FetchSource<T> for ScriptedSource<T> {
    fn fetch_page(&self, page: usize, page_size: usize) -> FetchFuture<T> {
        let mut state = self.state.borrow_mut();
        state.calls.push((page, page_size));
        let reply = state.pages.pop_front().unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(future::ready(reply))
    }
}

/// Serves `total` generated items, `page_size` at a time.
pub struct FiniteSource<T> {
    total: usize,
    make: Rc<dyn Fn(usize) -> T>,
    calls: Rc<RefCell<FetchCalls>>,
}

impl<T> Clone for FiniteSource<T> {
    fn clone(&self) -> Self {
        Self {
            total: self.total,
            make: Rc::clone(&self.make),
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<T: 'static> FiniteSource<T> {
    pub fn new(total: usize, make: impl Fn(usize) -> T + 'static) -> Self {
        Self {
            total,
            make: Rc::new(make),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> FetchCalls {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl<T: 'static> FetchSource<T> for FiniteSource<T> {
    fn fetch_page(&self, page: usize, page_size: usize) -> FetchFuture<T> {
        self.calls.borrow_mut().push((page, page_size));
        let start = page.saturating_mul(page_size).min(self.total);
        let end = start.saturating_add(page_size).min(self.total);
        let items: Vec<T> = (start..end).map(|i| (self.make)(i)).collect();
        Box::pin(future::ready(Ok::<_, FetchError>(items)))
    }
}

/// A fetch handed out by [`ManualSource`] and not yet settled.
#[derive(Debug)]
pub struct PendingFetch<T> {
    pub page: usize,
    pub page_size: usize,
    reply: oneshot::Sender<Result<Vec<T>, FetchError>>,
}

/// Pages stay pending until the test resolves or rejects them.
pub struct ManualSource<T> {
    state: Rc<RefCell<ManualState<T>>>,
}

struct ManualState<T> {
    pending: VecDeque<PendingFetch<T>>,
    calls: FetchCalls,
}

impl<T> Clone for ManualSource<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T: 'static> ManualSource<T> {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ManualState {
                pending: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// `(page, page_size)` of unsettled fetches, oldest first.
    pub fn pending(&self) -> FetchCalls {
        self.state
            .borrow()
            .pending
            .iter()
            .map(|p| (p.page, p.page_size))
            .collect()
    }

    pub fn calls(&self) -> FetchCalls {
        self.state.borrow().calls.clone()
    }

    /// Resolves the oldest pending fetch. Returns `false` if none is pending.
    pub fn resolve_next(&self, items: Vec<T>) -> bool {
        self.settle_next(Ok(items))
    }

    /// Rejects the oldest pending fetch. Returns `false` if none is pending.
    pub fn reject_next(&self, message: impl Into<String>) -> bool {
        self.settle_next(Err(FetchError::new(message)))
    }

    fn settle_next(&self, reply: Result<Vec<T>, FetchError>) -> bool {
        let Some(pending) = self.state.borrow_mut().pending.pop_front() else {
            return false;
        };
        // The grid may have been dropped; nothing is listening then.
        let _ = pending.reply.send(reply);
        true
    }
}

impl<T: 'static> Default for ManualSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> FetchSource<T> for ManualSource<T> {
    fn fetch_page(&self, page: usize, page_size: usize) -> FetchFuture<T> {
        let (reply, receiver) = oneshot::channel();
        let mut state = self.state.borrow_mut();
        state.calls.push((page, page_size));
        state.pending.push_back(PendingFetch {
            page,
            page_size,
            reply,
        });
        Box::pin(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(FetchError::new("fetch abandoned")))
        })
    }
}
