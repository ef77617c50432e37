//! Minimal headless host: fixed-height rows in a fixed-height viewport.

use std::cell::Cell;
use std::rc::Rc;

use futures::executor::LocalPool;
use scrollgrid::{GridConfig, GridError, GridTemplates, InfiniteGrid, ScrollMetrics};

const MAX_FRAMES: usize = 1_000;

pub struct Host<T: 'static> {
    pool: LocalPool,
    grid: InfiniteGrid<T>,
    dirty: Rc<Cell<bool>>,
    client_height: f32,
    row_height: f32,
    scroll_top: f32,
    rows: usize,
}

impl<T: 'static> Host<T> {
    pub fn new(
        config: GridConfig,
        templates: GridTemplates<T>,
        client_height: f32,
        row_height: f32,
    ) -> Result<Self, GridError> {
        let pool = LocalPool::new();
        let grid = InfiniteGrid::new(config, templates, pool.spawner())?;
        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        grid.add_invalidate_callback(Box::new(move || flag.set(true)));
        grid.add_fetch_error_listener(Box::new(|err| log::warn!("demo fetch failed: {err}")));

        Ok(Self {
            pool,
            grid,
            dirty,
            client_height,
            row_height,
            scroll_top: 0.0,
            rows: 0,
        })
    }

    pub fn grid(&self) -> &InfiniteGrid<T> {
        &self.grid
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            (self.rows + 1) as f32 * self.row_height,
            self.client_height,
            self.scroll_top,
        )
    }

    /// Runs fetches and frames until the grid stops asking for redraws.
    fn settle(&mut self) {
        for _ in 0..MAX_FRAMES {
            self.pool.run_until_stalled();
            if !self.dirty.replace(false) {
                return;
            }
            match self.grid.render() {
                Ok(tree) => self.rows = tree.rows.len(),
                Err(err) => log::error!("frame failed: {err}"),
            }
            self.grid.on_layout(self.metrics());
        }
        log::warn!("host gave up after {MAX_FRAMES} frames");
    }

    /// Keeps scrolling to the bottom until a scroll brings in no new rows.
    pub fn scroll_to_end(&mut self) {
        self.settle();
        loop {
            let before = self.grid.item_count();
            self.scroll_top = self.metrics().max_scroll_top();
            if !self.grid.on_scroll(self.metrics()) {
                break;
            }
            self.settle();
            log::info!("scrolled to {}px, {} rows", self.scroll_top, self.grid.item_count());
            if self.grid.item_count() == before {
                break;
            }
        }
    }

    pub fn markup(&self) -> Result<String, GridError> {
        Ok(self.grid.render()?.to_markup())
    }
}
