//! In-flight fetch marker.

use crate::render::{Element, RenderNode};

/// Text shown while a page is being fetched.
pub const LOADING_TEXT: &str = "fetching...";

/// Boolean visual signal toggled by the grid around each fetch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadingIndicator {
    fetching: bool,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    pub fn set_fetching(&mut self, fetching: bool) {
        self.fetching = fetching;
    }

    /// A status marker while fetching, nothing otherwise.
    pub fn render(&self) -> Option<RenderNode> {
        self.fetching.then(|| {
            Element::new("span")
                .attr("class", "scrollgrid-loading")
                .attr("role", "status")
                .child(RenderNode::text(LOADING_TEXT))
                .into()
        })
    }
}
