use futures::executor::LocalPool;
use scrollgrid::{
    FetchSource, GridConfig, GridError, GridTemplates, GridTree, InfiniteGrid, ScrollMetrics,
};
use std::cell::Cell;
use std::rc::Rc;

/// Frames [`GridTestRule::await_idle`] may draw before giving up.
pub const MAX_SETTLE_FRAMES: usize = 100;

/// Simulated scroll container. Content height is derived from the rows of
/// the last rendered tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub client_height: f32,
    pub header_height: f32,
    pub row_height: f32,
    pub scroll_top: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            client_height: 500.0,
            header_height: 40.0,
            row_height: 40.0,
            scroll_top: 0.0,
        }
    }
}

impl Viewport {
    pub fn new(client_height: f32, row_height: f32) -> Self {
        Self {
            client_height,
            row_height,
            ..Self::default()
        }
    }

    pub fn with_header_height(mut self, header_height: f32) -> Self {
        self.header_height = header_height;
        self
    }

    /// Metrics for `rows` laid-out rows at the current scroll position.
    pub fn metrics(&self, rows: usize) -> ScrollMetrics {
        ScrollMetrics::new(
            self.header_height + rows as f32 * self.row_height,
            self.client_height,
            self.scroll_top,
        )
    }
}

/// Host stand-in that drives an [`InfiniteGrid`] until it settles.
pub struct GridTestRule<T: 'static> {
    pool: LocalPool,
    grid: InfiniteGrid<T>,
    viewport: Viewport,
    needs_redraw: Rc<Cell<bool>>,
    last_tree: Option<GridTree>,
    last_render_error: Option<GridError>,
    frames: usize,
}

impl<T: 'static> GridTestRule<T> {
    /// Creates a rule with the default viewport.
    ///
    /// Panics if `config` is invalid.
    pub fn new(config: GridConfig, templates: GridTemplates<T>) -> Self {
        match Self::try_new(config, templates, Viewport::default()) {
            Ok(rule) => rule,
            Err(err) => panic!("Could not create grid under test: {err}"),
        }
    }

    pub fn try_new(
        config: GridConfig,
        templates: GridTemplates<T>,
        viewport: Viewport,
    ) -> Result<Self, GridError> {
        let pool = LocalPool::new();
        let grid = InfiniteGrid::new(config, templates, pool.spawner())?;

        let needs_redraw = Rc::new(Cell::new(true));
        let flag = Rc::clone(&needs_redraw);
        grid.add_invalidate_callback(Box::new(move || flag.set(true)));

        Ok(Self {
            pool,
            grid,
            viewport,
            needs_redraw,
            last_tree: None,
            last_render_error: None,
            frames: 0,
        })
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn grid(&self) -> &InfiniteGrid<T> {
        &self.grid
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Tree from the last successful frame.
    pub fn tree(&self) -> Option<&GridTree> {
        self.last_tree.as_ref()
    }

    /// Error from the last frame, if it failed to render.
    pub fn render_error(&self) -> Option<&GridError> {
        self.last_render_error.as_ref()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Current metrics of the simulated container.
    pub fn metrics(&self) -> ScrollMetrics {
        let rows = self.last_tree.as_ref().map_or(0, |tree| tree.rows.len());
        self.viewport.metrics(rows)
    }

    /// Installs `source` and settles.
    pub fn set_fetch_source<S>(&mut self, source: S) -> bool
    where
        S: FetchSource<T> + 'static,
    {
        let started = self.grid.set_fetch_source(source);
        self.await_idle();
        started
    }

    /// Runs ready fetch tasks without drawing.
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Runs tasks and draws frames until nothing is pending.
    ///
    /// Every frame renders the grid and reports layout, which may start the
    /// next viewport-fill fetch. Panics after [`MAX_SETTLE_FRAMES`].
    pub fn await_idle(&mut self) {
        let mut i = 0;
        loop {
            self.pool.run_until_stalled();
            if !self.needs_redraw.replace(false) {
                break;
            }
            self.draw_frame();
            i += 1;
            if i > MAX_SETTLE_FRAMES {
                panic!("Grid failed to settle after {MAX_SETTLE_FRAMES} frames");
            }
        }
    }

    /// Scrolls to `scroll_top` (clamped), dispatches the scroll event and
    /// settles. Returns whether the scroll started a fetch.
    pub fn scroll_to(&mut self, scroll_top: f32) -> bool {
        let max = self.metrics().max_scroll_top();
        self.viewport.scroll_top = scroll_top.clamp(0.0, max);
        let started = self.grid.on_scroll(self.metrics());
        self.await_idle();
        started
    }

    pub fn scroll_by(&mut self, delta: f32) -> bool {
        self.scroll_to(self.viewport.scroll_top + delta)
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        self.scroll_to(f32::MAX)
    }

    /// Dispatches a scroll event with explicit metrics, bypassing the
    /// simulated viewport, and settles.
    pub fn dispatch_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        let started = self.grid.on_scroll(metrics);
        self.await_idle();
        started
    }

    fn draw_frame(&mut self) {
        match self.grid.render() {
            Ok(tree) => {
                self.last_tree = Some(tree);
                self.last_render_error = None;
            }
            Err(err) => {
                log::debug!("frame {} failed to render: {err}", self.frames);
                self.last_render_error = Some(err);
            }
        }
        self.frames += 1;
        let metrics = self.metrics();
        self.grid.on_layout(metrics);
    }
}

impl<T: 'static> std::fmt::Debug for GridTestRule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridTestRule")
            .field("grid", &self.grid)
            .field("viewport", &self.viewport)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
