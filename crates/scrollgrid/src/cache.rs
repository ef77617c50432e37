//! Per-index row render cache.
//!
//! Row output is frozen at first render: once index `i` has a fragment, it
//! is returned as-is until the cache is cleared, even if the item at `i`
//! has changed since. The cache is dense, so index `i` can only be stored
//! after every lower index.

use std::rc::Rc;

use scrollgrid_foundation::{RenderNode, TemplateError};

#[derive(Debug, Default)]
pub struct RowCache {
    rows: Vec<Rc<RenderNode>>,
    hits: usize,
    compiled: usize,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cached fragment at `index`, if rendered.
    pub fn get(&self, index: usize) -> Option<Rc<RenderNode>> {
        self.rows.get(index).cloned()
    }

    /// Cached fragment at `index`, counted as a hit.
    pub fn hit(&mut self, index: usize) -> Option<Rc<RenderNode>> {
        let row = self.rows.get(index).cloned()?;
        self.hits += 1;
        Some(row)
    }

    /// Freezes `node` as the fragment for `index`.
    ///
    /// If `index` was stored in the meantime the earlier fragment wins.
    /// Storing past the next free index is an error.
    pub fn store(
        &mut self,
        index: usize,
        node: RenderNode,
    ) -> Result<Rc<RenderNode>, TemplateError> {
        if let Some(row) = self.rows.get(index) {
            return Ok(Rc::clone(row));
        }
        self.check_dense(index)?;

        let row = Rc::new(node);
        self.rows.push(Rc::clone(&row));
        self.compiled += 1;
        Ok(row)
    }

    fn check_dense(&self, index: usize) -> Result<(), TemplateError> {
        if index > self.rows.len() {
            return Err(TemplateError::render(format!(
                "row {index} requested before row {}",
                self.rows.len()
            )));
        }
        Ok(())
    }

    /// Number of lookups served from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Number of rows rendered by a template.
    pub fn compiled(&self) -> usize {
        self.compiled
    }

    /// Drops every cached row. Counters are kept.
    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
