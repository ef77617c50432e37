//! Header/row templates from declared child markup.
//!
//! Hosts that describe a grid declaratively hand over its immediate
//! children. The first header marker and the first row marker supply the
//! header and row templates; later markers of either kind are reported and
//! ignored. Other children are skipped.

use smallvec::SmallVec;

use crate::markup::MarkupTemplate;
use crate::record::Record;
use crate::template::GridTemplates;

/// Kind of a declared child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildMarker {
    /// Inner markup becomes the header template.
    Header,
    /// Inner markup becomes the row template.
    Row,
    /// Any other element, identified by tag.
    Other(String),
}

/// An immediate child of the grid in its declared markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredChild {
    pub marker: ChildMarker,
    pub inner_markup: String,
}

impl DeclaredChild {
    pub fn header(inner_markup: impl Into<String>) -> Self {
        Self {
            marker: ChildMarker::Header,
            inner_markup: inner_markup.into(),
        }
    }

    pub fn row(inner_markup: impl Into<String>) -> Self {
        Self {
            marker: ChildMarker::Row,
            inner_markup: inner_markup.into(),
        }
    }

    pub fn other(tag: impl Into<String>, inner_markup: impl Into<String>) -> Self {
        Self {
            marker: ChildMarker::Other(tag.into()),
            inner_markup: inner_markup.into(),
        }
    }
}

/// Non-fatal configuration problem found while scanning declared children.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeclaredMarkupError {
    #[error("only one header template is allowed; ignoring child #{position}")]
    DuplicateHeader { position: usize },

    #[error("only one row template is allowed; ignoring child #{position}")]
    DuplicateRow { position: usize },
}

/// Result of scanning declared children.
#[derive(Clone, Debug, Default)]
pub struct DeclaredTemplates {
    /// Header template; empty when no header marker was declared.
    pub header: MarkupTemplate,

    /// Row template; empty when no row marker was declared.
    pub row: MarkupTemplate,

    /// Duplicates that were ignored.
    pub diagnostics: SmallVec<[DeclaredMarkupError; 2]>,
}

impl DeclaredTemplates {
    /// Scans children in declaration order. First marker of each kind wins.
    pub fn scan<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a DeclaredChild>,
    {
        let mut header: Option<MarkupTemplate> = None;
        let mut row: Option<MarkupTemplate> = None;
        let mut diagnostics = SmallVec::new();

        for (position, child) in children.into_iter().enumerate() {
            match &child.marker {
                ChildMarker::Header => {
                    if header.is_some() {
                        let err = DeclaredMarkupError::DuplicateHeader { position };
                        log::error!("{err}");
                        diagnostics.push(err);
                    } else {
                        header = Some(MarkupTemplate::new(child.inner_markup.as_str()));
                    }
                }
                ChildMarker::Row => {
                    if row.is_some() {
                        let err = DeclaredMarkupError::DuplicateRow { position };
                        log::error!("{err}");
                        diagnostics.push(err);
                    } else {
                        row = Some(MarkupTemplate::new(child.inner_markup.as_str()));
                    }
                }
                ChildMarker::Other(tag) => {
                    log::trace!("skipping declared child <{tag}> at #{position}");
                }
            }
        }

        Self {
            header: header.unwrap_or_default(),
            row: row.unwrap_or_default(),
            diagnostics,
        }
    }

    /// Whether any duplicate marker was ignored.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Converts the scanned markup into grid templates.
    pub fn into_templates(self) -> GridTemplates<Record> {
        GridTemplates::new(self.header, self.row)
    }
}

impl GridTemplates<Record> {
    /// Builds record templates from declared children, logging duplicates.
    pub fn from_declared<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a DeclaredChild>,
    {
        DeclaredTemplates::scan(children).into_templates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record;
    use crate::render::RenderNode;
    use serde_json::json;

    #[test]
    fn test_first_markers_win() {
        let children = vec![
            DeclaredChild::other("style", "div {}"),
            DeclaredChild::header("<tr><th>Name</th></tr>"),
            DeclaredChild::row("<tr><td>${item.name}</td></tr>"),
            DeclaredChild::header("<tr><th>Ignored</th></tr>"),
            DeclaredChild::row("<tr><td>ignored</td></tr>"),
        ];

        let scanned = DeclaredTemplates::scan(&children);
        assert_eq!(scanned.header.source(), "<tr><th>Name</th></tr>");
        assert_eq!(scanned.row.source(), "<tr><td>${item.name}</td></tr>");
        assert_eq!(
            scanned.diagnostics.as_slice(),
            &[
                DeclaredMarkupError::DuplicateHeader { position: 3 },
                DeclaredMarkupError::DuplicateRow { position: 4 },
            ]
        );
    }

    #[test]
    fn test_missing_markers_are_empty() {
        let scanned = DeclaredTemplates::scan(&[]);
        assert!(scanned.header.is_empty());
        assert!(scanned.row.is_empty());
        assert!(!scanned.has_diagnostics());
    }

    #[test]
    fn test_from_declared_renders_records() {
        let children = [DeclaredChild::row("<tr><td>${item.name}</td></tr>")];
        let templates = GridTemplates::from_declared(&children);

        let row = templates
            .row
            .render_row(&record([("name", json!("a"))]), 0)
            .unwrap();
        assert_eq!(row, RenderNode::markup("<tr><td>a</td></tr>"));
    }
}
