//! Scroll-driven paged data grid.
//!
//! [`InfiniteGrid`] owns an append-only item collection that grows one page
//! at a time as the user scrolls towards the bottom of the viewport. The
//! host drives it through three calls:
//!
//! - [`InfiniteGrid::set_fetch_source`] - install a page source and load page 0
//! - [`InfiniteGrid::on_scroll`] / [`InfiniteGrid::on_layout`] - report viewport metrics
//! - [`InfiniteGrid::render`] - produce a [`GridTree`] to display
//!
//! Re-render requests are delivered through invalidate callbacks; fetch
//! futures run on the host's single-threaded executor.
//!
//! # Example
//!
//! ```rust,ignore
//! let grid = InfiniteGrid::new(GridConfig::default(), templates, pool.spawner())?;
//! grid.add_invalidate_callback(Box::new(move || request_frame()));
//! grid.set_fetch_source(|page, size| api.load(page, size));
//! ```

mod cache;
mod config;
mod error;
mod fetch;
mod grid;
mod tree;

pub use cache::*;
pub use config::*;
pub use error::*;
pub use fetch::*;
pub use grid::*;
pub use tree::*;

pub use scrollgrid_foundation as foundation;
pub use scrollgrid_foundation::{
    record, DeclaredChild, DeclaredTemplates, Element, GridTemplates, HeaderTemplate,
    LoadingIndicator, MarkupTemplate, Record, RenderNode, RenderResult, RowTemplate,
    ScrollMetrics, TemplateError,
};
