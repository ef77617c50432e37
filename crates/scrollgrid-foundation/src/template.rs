//! Typed render functions for grid headers and rows.
//!
//! A row template maps `(item, index)` to a [`RenderNode`]; a header
//! template takes no input. Closures implement both traits, so hosts can
//! pass plain functions as configuration.

use std::rc::Rc;

use crate::render::RenderNode;

/// Failure while rendering a header or row.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    /// A `${` was never closed.
    #[error("unterminated placeholder starting at byte {offset}")]
    UnterminatedPlaceholder { offset: usize },

    /// A `${}` with nothing inside.
    #[error("empty placeholder at byte {offset}")]
    EmptyPlaceholder { offset: usize },

    /// The placeholder names something the render context does not bind.
    #[error("unknown binding `{name}`")]
    UnknownBinding { name: String },

    /// Failure reported by a host-supplied template function.
    #[error("{message}")]
    Render { message: String },
}

impl TemplateError {
    /// Creates a host render failure.
    pub fn render(message: impl Into<String>) -> Self {
        TemplateError::Render {
            message: message.into(),
        }
    }
}

/// Result of rendering a header or row.
pub type RenderResult = Result<RenderNode, TemplateError>;

/// Renders one row of the grid.
pub trait RowTemplate<T> {
    /// Produces the fragment for `item` at position `index`.
    fn render_row(&self, item: &T, index: usize) -> RenderResult;
}

impl<T, F> RowTemplate<T> for F
where
    F: Fn(&T, usize) -> RenderResult,
{
    fn render_row(&self, item: &T, index: usize) -> RenderResult {
        self(item, index)
    }
}

/// Renders the grid header.
pub trait HeaderTemplate {
    /// Produces the header fragment.
    fn render_header(&self) -> RenderResult;
}

impl<F> HeaderTemplate for F
where
    F: Fn() -> RenderResult,
{
    fn render_header(&self) -> RenderResult {
        self()
    }
}

/// Header and row templates handed to a grid at construction.
pub struct GridTemplates<T> {
    /// Rendered on every pass, never cached.
    pub header: Rc<dyn HeaderTemplate>,

    /// Rendered once per index and then frozen.
    pub row: Rc<dyn RowTemplate<T>>,
}

impl<T> Clone for GridTemplates<T> {
    fn clone(&self) -> Self {
        Self {
            header: Rc::clone(&self.header),
            row: Rc::clone(&self.row),
        }
    }
}

impl<T> std::fmt::Debug for GridTemplates<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridTemplates").finish_non_exhaustive()
    }
}

impl<T: 'static> GridTemplates<T> {
    /// Creates templates from a header and a row renderer.
    pub fn new<H, R>(header: H, row: R) -> Self
    where
        H: HeaderTemplate + 'static,
        R: RowTemplate<T> + 'static,
    {
        Self {
            header: Rc::new(header),
            row: Rc::new(row),
        }
    }

    /// Creates templates with an empty header.
    pub fn rows_only<R>(row: R) -> Self
    where
        R: RowTemplate<T> + 'static,
    {
        Self::new(empty_header, row)
    }
}

fn empty_header() -> RenderResult {
    Ok(RenderNode::markup(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Element;

    #[test]
    fn test_closures_are_templates() {
        let templates = GridTemplates::new(
            || -> RenderResult { Ok(Element::new("thead").into()) },
            |item: &String, index: usize| -> RenderResult {
                Ok(Element::new("tr")
                    .key(index as u64)
                    .child(RenderNode::text(item.clone()))
                    .into())
            },
        );

        let header = templates.header.render_header().unwrap();
        assert_eq!(header.to_markup(), "<thead></thead>");

        let row = templates.row.render_row(&"a".to_string(), 4).unwrap();
        assert_eq!(row.as_element().and_then(|e| e.key), Some(4));
    }

    #[test]
    fn test_rows_only_header_is_empty() {
        let templates = GridTemplates::rows_only(|_: &u32, _: usize| -> RenderResult {
            Ok(RenderNode::text("x"))
        });
        assert_eq!(templates.header.render_header().unwrap().to_markup(), "");
    }

    #[test]
    fn test_render_error_message() {
        let err = TemplateError::render("boom");
        assert_eq!(err.to_string(), "boom");
    }
}
