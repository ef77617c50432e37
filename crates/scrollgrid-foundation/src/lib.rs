//! Foundation elements for scrollgrid.
//!
//! This crate holds the framework-independent building blocks the grid
//! container is assembled from:
//!
//! - [`RenderNode`] - structured render output handed to the host
//! - [`Record`] - opaque field/value item used by markup templates
//! - [`RowTemplate`] / [`HeaderTemplate`] - typed render functions
//! - [`MarkupTemplate`] - safe `${binding}` interpolation over records
//! - [`DeclaredTemplates`] - header/row extraction from declared child markup
//! - [`ScrollMetrics`] - viewport measurements reported by the host
//! - [`LoadingIndicator`] - the in-flight fetch marker

mod declared;
mod loading;
mod markup;
mod record;
mod render;
mod scroll;
mod template;

pub use declared::*;
pub use loading::*;
pub use markup::*;
pub use record::*;
pub use render::*;
pub use scroll::*;
pub use template::*;
