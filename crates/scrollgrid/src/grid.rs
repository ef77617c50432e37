//! Grid container state machine.
//!
//! Provides [`InfiniteGrid`], the scroll-driven paging controller.
//!
//! Per fetch source the grid cycles between [`FetchPhase::Idle`] and
//! [`FetchPhase::Fetching`]:
//!
//! ```text
//! Idle --set_fetch_source--> Fetching --page arrives--> Idle
//!   ^                           ^                         |
//!   |                           +--layout: not scrollable-+  (non-empty page)
//!   +------------- scroll within threshold: fetch --------+
//! ```
//!
//! A failed page also returns to `Idle`, so the next scroll or an explicit
//! [`InfiniteGrid::retry`] asks for the same page again.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures_task::{LocalFutureObj, LocalSpawn};
use scrollgrid_foundation::{
    GridTemplates, LoadingIndicator, RenderNode, ScrollMetrics, TemplateError,
};
use web_time::Instant;

use crate::cache::RowCache;
use crate::config::{validate_page_size, validate_scroll_offset, GridConfig};
use crate::error::{FetchError, GridError};
use crate::fetch::{FetchPhase, FetchSource};
use crate::tree::{GridTree, KeyedRow};

/// Counters describing what the grid has done so far.
///
/// Used for testing and debugging paging behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Items currently held.
    pub items: usize,

    /// Rows currently in the render cache.
    pub cached_rows: usize,

    /// Pages that completed successfully.
    pub pages_fetched: usize,

    /// Fetches handed to a fetch source.
    pub fetches_started: usize,

    /// Fetches that failed or could not be scheduled.
    pub fetches_failed: usize,

    /// Rows rendered by the row template.
    pub rows_compiled: usize,

    /// Row lookups served from the cache.
    pub cache_hits: usize,
}

/// Scroll-driven paged grid.
///
/// Cloning yields another handle to the same grid.
///
/// # Example
///
/// ```rust,ignore
/// let grid = InfiniteGrid::new(GridConfig::default(), templates, pool.spawner())?;
/// grid.set_fetch_source(|page, size| load_page(page, size));
///
/// // scroll handler
/// grid.on_scroll(ScrollMetrics::new(1000.0, 500.0, 460.0));
///
/// // frame
/// let tree = grid.render()?;
/// grid.on_layout(measure(&tree));
/// ```
pub struct InfiniteGrid<T> {
    inner: Rc<RefCell<GridInner<T>>>,
    spawner: Rc<dyn LocalSpawn>,
}

struct GridInner<T> {
    config: GridConfig,
    templates: GridTemplates<T>,

    /// Append-only within one fetch-source lifetime. Kept in its own cell so
    /// templates can read the grid while a row is being rendered.
    items: Rc<RefCell<Vec<T>>>,

    /// Next page to request.
    page_number: usize,

    phase: FetchPhase,

    /// Bumped whenever the fetch source changes; completions from an older
    /// generation are discarded.
    generation: u64,

    source: Option<Rc<dyn FetchSource<T>>>,
    loading: LoadingIndicator,
    rows: RowCache,

    /// Set by a non-empty page; consumed by the next layout report.
    fill_check_pending: bool,

    last_error: Option<GridError>,

    pages_fetched: usize,
    fetches_started: usize,
    fetches_failed: usize,

    invalidate_callbacks: Vec<(u64, Rc<dyn Fn()>)>,
    error_listeners: Vec<(u64, Rc<dyn Fn(&GridError)>)>,
    next_callback_id: u64,
}

impl<T> GridInner<T> {
    fn reset_data(&mut self) {
        self.items.borrow_mut().clear();
        self.page_number = 0;
        self.rows.clear();
        self.phase = FetchPhase::Idle;
        self.loading.set_fetching(false);
        self.fill_check_pending = false;
        self.last_error = None;
    }

    fn next_callback_id(&mut self) -> u64 {
        let id = self.next_callback_id;
        self.next_callback_id += 1;
        id
    }
}

impl<T> Clone for InfiniteGrid<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            spawner: Rc::clone(&self.spawner),
        }
    }
}

impl<T> std::fmt::Debug for InfiniteGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        let result = f.debug_struct("InfiniteGrid")
            .field("config", &inner.config)
            .field("phase", &inner.phase)
            .field("items", &inner.items.borrow().len())
            .field("page_number", &inner.page_number)
            .field("cached_rows", &inner.rows.len())
            .finish_non_exhaustive();
        result
    }
}

impl<T: 'static> InfiniteGrid<T> {
    /// Creates an idle grid with no fetch source.
    ///
    /// `spawner` runs fetch futures; it must be driven by the same thread
    /// that owns the grid.
    pub fn new<S>(
        config: GridConfig,
        templates: GridTemplates<T>,
        spawner: S,
    ) -> Result<Self, GridError>
    where
        S: LocalSpawn + 'static,
    {
        config.validate()?;
        Ok(Self {
            inner: Rc::new(RefCell::new(GridInner {
                config,
                templates,
                items: Rc::new(RefCell::new(Vec::new())),
                page_number: 0,
                phase: FetchPhase::Idle,
                generation: 0,
                source: None,
                loading: LoadingIndicator::new(),
                rows: RowCache::new(),
                fill_check_pending: false,
                last_error: None,
                pages_fetched: 0,
                fetches_started: 0,
                fetches_failed: 0,
                invalidate_callbacks: Vec::new(),
                error_listeners: Vec::new(),
                next_callback_id: 1,
            })),
            spawner: Rc::new(spawner),
        })
    }

    /// Installs a new fetch source.
    ///
    /// Items, cursor, row cache and last error are reset, any in-flight page
    /// from the previous source is abandoned, and page 0 is requested.
    /// Returns whether the initial fetch was issued.
    pub fn set_fetch_source<S>(&self, source: S) -> bool
    where
        S: FetchSource<T> + 'static,
    {
        {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.source = Some(Rc::new(source));
            inner.reset_data();
            log::debug!("fetch source replaced (generation {})", inner.generation);
        }

        let started = self.fetch();
        if !started {
            self.invalidate();
        }
        started
    }

    /// Removes the fetch source. Items already loaded are kept; an in-flight
    /// page is abandoned.
    pub fn clear_fetch_source(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.source = None;
            inner.phase = FetchPhase::Idle;
            inner.loading.set_fetching(false);
            inner.fill_check_pending = false;
        }
        self.invalidate();
    }

    /// Requests the next page.
    ///
    /// No-op returning `false` when a page is already in flight or there is
    /// no fetch source.
    pub fn fetch(&self) -> bool {
        let (source, page, page_size, generation) = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase == FetchPhase::Fetching {
                log::trace!("fetch skipped: page {} already in flight", inner.page_number);
                return false;
            }
            let Some(source) = inner.source.clone() else {
                log::trace!("fetch skipped: no fetch source");
                return false;
            };

            inner.phase = FetchPhase::Fetching;
            inner.loading.set_fetching(true);
            inner.fill_check_pending = false;
            inner.fetches_started += 1;
            (
                source,
                inner.page_number,
                inner.config.page_size,
                inner.generation,
            )
        };

        log::debug!("fetching page {page} (page size {page_size})");
        let started = Instant::now();
        let future = source.fetch_page(page, page_size);

        let weak: Weak<RefCell<GridInner<T>>> = Rc::downgrade(&self.inner);
        let spawner = Rc::clone(&self.spawner);
        let task = async move {
            let result = future.await;
            // A dropped grid has nobody left to deliver the page to.
            if let Some(inner) = weak.upgrade() {
                let grid = InfiniteGrid { inner, spawner };
                grid.complete_fetch(generation, page, started, result);
            }
        };

        if let Err(err) = self
            .spawner
            .spawn_local_obj(LocalFutureObj::new(Box::pin(task)))
        {
            let error = GridError::Spawn {
                page,
                reason: err.to_string(),
            };
            self.fail_fetch(generation, error);
            return false;
        }

        self.invalidate();
        true
    }

    /// Requests the page that failed last, or the next page.
    pub fn retry(&self) -> bool {
        if let Some(error) = self.last_error() {
            log::debug!("retrying after: {error}");
        }
        self.fetch()
    }

    /// Handles a scroll event. Fetches when the remaining distance to the
    /// bottom is below the configured scroll offset.
    pub fn on_scroll(&self, metrics: ScrollMetrics) -> bool {
        let threshold = self.inner.borrow().config.scroll_offset;
        if metrics.should_prefetch(threshold) {
            log::trace!(
                "scroll within {threshold}px of bottom (remaining {})",
                metrics.remaining()
            );
            self.fetch()
        } else {
            false
        }
    }

    /// Handles a layout report made after rendering.
    ///
    /// When the last page was non-empty and the content still does not
    /// overflow the viewport, fetches the next page. Repeats until the
    /// viewport is filled or a page comes back empty.
    pub fn on_layout(&self, metrics: ScrollMetrics) -> bool {
        let pending = std::mem::take(&mut self.inner.borrow_mut().fill_check_pending);
        if !pending || metrics.is_scrollable() {
            return false;
        }
        log::debug!(
            "viewport not filled ({} <= {}), fetching next page",
            metrics.scroll_height,
            metrics.client_height
        );
        self.fetch()
    }

    /// Renders the header, every item row and the loading indicator.
    ///
    /// The header is rendered on every call. Rows are rendered once per
    /// index and reused afterwards. A template failure aborts this render;
    /// rows rendered before it stay cached.
    ///
    /// Templates run with no internal borrow held, so they may read the
    /// grid. They must not replace its items or its fetch source.
    pub fn render(&self) -> Result<GridTree, GridError> {
        let (templates, items) = {
            let inner = self.inner.borrow();
            (inner.templates.clone(), Rc::clone(&inner.items))
        };

        let header = templates
            .header
            .render_header()
            .map_err(|source| template_error(None, source))?;

        let count = items.borrow().len();
        let mut rows = Vec::with_capacity(count);
        for index in 0..count {
            let fragment = self.row_fragment(&templates, &items, index)?;
            rows.push(KeyedRow {
                key: index,
                fragment,
            });
        }

        Ok(GridTree {
            header,
            rows,
            loading: self.inner.borrow().loading.render(),
        })
    }

    /// Memoized fragment for the row at `index`; `None` past the last item.
    pub fn row(&self, index: usize) -> Result<Option<Rc<RenderNode>>, GridError> {
        let (templates, items, first_missing) = {
            let inner = self.inner.borrow();
            (
                inner.templates.clone(),
                Rc::clone(&inner.items),
                inner.rows.len(),
            )
        };
        if index >= items.borrow().len() {
            return Ok(None);
        }

        let mut fragment = None;
        for i in first_missing.min(index)..=index {
            fragment = Some(self.row_fragment(&templates, &items, i)?);
        }
        Ok(fragment)
    }

    fn row_fragment(
        &self,
        templates: &GridTemplates<T>,
        items: &RefCell<Vec<T>>,
        index: usize,
    ) -> Result<Rc<RenderNode>, GridError> {
        let cached = self.inner.borrow_mut().rows.hit(index);
        if let Some(row) = cached {
            return Ok(row);
        }

        let rendered = {
            let items = items.borrow();
            match items.get(index) {
                Some(item) => templates.row.render_row(item, index),
                None => Err(TemplateError::render(format!(
                    "row {index} is past the last item"
                ))),
            }
        };
        let node = rendered.map_err(|source| template_error(Some(index), source))?;

        self.inner
            .borrow_mut()
            .rows
            .store(index, node)
            .map_err(|source| template_error(Some(index), source))
    }

    /// Replaces the item collection. The row cache is dropped because its
    /// entries describe the old items.
    pub fn set_items(&self, items: Vec<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            *inner.items.borrow_mut() = items;
            inner.rows.clear();
        }
        self.invalidate();
    }

    /// Runs `f` over the current items. `f` may read the grid.
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let items = self.items_cell();
        let items = items.borrow();
        f(&items)
    }

    /// Mutates items in place. Already-rendered rows keep their output.
    ///
    /// `f` holds the items exclusively: it may read the grid's paging state
    /// but must not read items, render or replace the fetch source.
    pub fn with_items_mut<R>(&self, f: impl FnOnce(&mut [T]) -> R) -> R {
        let items = self.items_cell();
        let result = f(&mut items.borrow_mut());
        self.invalidate();
        result
    }

    /// Clones the current items.
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items_cell().borrow().clone()
    }

    pub fn item_count(&self) -> usize {
        self.items_cell().borrow().len()
    }

    fn items_cell(&self) -> Rc<RefCell<Vec<T>>> {
        Rc::clone(&self.inner.borrow().items)
    }

    /// Pages fetched for the current source.
    pub fn page_number(&self) -> usize {
        self.inner.borrow().page_number
    }

    pub fn phase(&self) -> FetchPhase {
        self.inner.borrow().phase
    }

    pub fn is_fetching(&self) -> bool {
        self.phase() == FetchPhase::Fetching
    }

    /// Whether the loading indicator is on.
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().loading.is_fetching()
    }

    pub fn has_fetch_source(&self) -> bool {
        self.inner.borrow().source.is_some()
    }

    /// The most recent fetch failure, cleared by the next successful page.
    pub fn last_error(&self) -> Option<GridError> {
        self.inner.borrow().last_error.clone()
    }

    pub fn config(&self) -> GridConfig {
        self.inner.borrow().config.clone()
    }

    /// Changes the page size used by subsequent fetches.
    pub fn set_page_size(&self, page_size: usize) -> Result<(), GridError> {
        validate_page_size(page_size)?;
        self.inner.borrow_mut().config.page_size = page_size;
        Ok(())
    }

    /// Changes the prefetch threshold.
    pub fn set_scroll_offset(&self, scroll_offset: f32) -> Result<(), GridError> {
        validate_scroll_offset(scroll_offset)?;
        self.inner.borrow_mut().config.scroll_offset = scroll_offset;
        Ok(())
    }

    pub fn stats(&self) -> GridStats {
        let inner = self.inner.borrow();
        let stats = GridStats {
            items: inner.items.borrow().len(),
            cached_rows: inner.rows.len(),
            pages_fetched: inner.pages_fetched,
            fetches_started: inner.fetches_started,
            fetches_failed: inner.fetches_failed,
            rows_compiled: inner.rows.compiled(),
            cache_hits: inner.rows.hits(),
        };
        stats
    }

    /// Registers a re-render request callback.
    pub fn add_invalidate_callback(&self, callback: Box<dyn Fn()>) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_callback_id();
        inner.invalidate_callbacks.push((id, Rc::from(callback)));
        id
    }

    pub fn remove_invalidate_callback(&self, id: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.invalidate_callbacks.retain(|(cb_id, _)| *cb_id != id);
    }

    /// Registers a listener for fetch and scheduling failures.
    pub fn add_fetch_error_listener(&self, listener: Box<dyn Fn(&GridError)>) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_callback_id();
        inner.error_listeners.push((id, Rc::from(listener)));
        id
    }

    pub fn remove_fetch_error_listener(&self, id: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.error_listeners.retain(|(cb_id, _)| *cb_id != id);
    }

    fn complete_fetch(
        &self,
        generation: u64,
        page: usize,
        started: Instant,
        result: Result<Vec<T>, FetchError>,
    ) {
        let batch = match result {
            Ok(batch) => batch,
            Err(source) => {
                self.fail_fetch(generation, GridError::Fetch { page, source });
                return;
            }
        };

        {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                log::debug!("discarding page {page} from a replaced fetch source");
                return;
            }

            let count = batch.len();
            inner.items.borrow_mut().extend(batch);
            inner.page_number += 1;
            inner.pages_fetched += 1;
            inner.phase = FetchPhase::Idle;
            inner.loading.set_fetching(false);
            inner.fill_check_pending = count > 0;
            inner.last_error = None;
            log::debug!(
                "page {page} fetched {count} items in {:?} ({} total)",
                started.elapsed(),
                inner.items.borrow().len()
            );
        }
        self.invalidate();
    }

    fn fail_fetch(&self, generation: u64, error: GridError) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.generation != generation {
                log::debug!("discarding failure from a replaced fetch source: {error}");
                return;
            }
            inner.phase = FetchPhase::Idle;
            inner.loading.set_fetching(false);
            inner.fill_check_pending = false;
            inner.fetches_failed += 1;
            inner.last_error = Some(error.clone());
        }
        log::warn!("{error}");

        let listeners: Vec<_> = self
            .inner
            .borrow()
            .error_listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&error);
        }
        self.invalidate();
    }

    fn invalidate(&self) {
        // Callbacks may re-enter the grid, so none run under the borrow.
        let callbacks: Vec<_> = self
            .inner
            .borrow()
            .invalidate_callbacks
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}

fn template_error(index: Option<usize>, source: TemplateError) -> GridError {
    let error = GridError::Template { index, source };
    log::error!("{error}");
    error
}
