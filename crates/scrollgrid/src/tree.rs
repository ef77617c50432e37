//! Render output of a grid pass.

use std::rc::Rc;

use scrollgrid_foundation::{Element, RenderNode};

/// CSS class of the scroll container.
pub const VIEWPORT_CLASS: &str = "scrollgrid-viewport";

/// A row fragment keyed by its index for stable reconciliation.
#[derive(Clone, Debug)]
pub struct KeyedRow {
    pub key: usize,
    pub fragment: Rc<RenderNode>,
}

/// Header, keyed rows and loading indicator produced by one render.
#[derive(Clone, Debug)]
pub struct GridTree {
    pub header: RenderNode,
    pub rows: Vec<KeyedRow>,
    pub loading: Option<RenderNode>,
}

impl GridTree {
    /// Row keys in render order.
    pub fn row_keys(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.key).collect()
    }

    /// Builds the full container: scroll viewport > table (header, rows),
    /// followed by the loading indicator.
    pub fn to_node(&self) -> RenderNode {
        let rows = self.rows.iter().map(|row| {
            // Markup fragments are wrapped so every row carries its key.
            match row.fragment.as_ref() {
                RenderNode::Element(element) if element.key.is_some() => {
                    RenderNode::Element(element.clone())
                }
                RenderNode::Element(element) => {
                    RenderNode::Element(element.clone().key(row.key as u64))
                }
                other => Element::new("tbody")
                    .key(row.key as u64)
                    .child(other.clone())
                    .into(),
            }
        });

        let table = Element::new("table")
            .attr("style", "border-collapse: collapse;")
            .child(self.header.clone())
            .children(rows);

        Element::new("div")
            .attr("class", VIEWPORT_CLASS)
            .child(table)
            .children(self.loading.clone())
            .into()
    }

    /// Serialises the full container.
    pub fn to_markup(&self) -> String {
        self.to_node().to_markup()
    }
}
