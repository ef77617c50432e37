//! Safe markup interpolation.
//!
//! A [`MarkupTemplate`] is literal markup with `${binding}` placeholders.
//! Bindings are looked up, never evaluated:
//!
//! - `index` - the row index
//! - `item` - the whole record as JSON
//! - `item.field.nested` - a path into the record; a missing field renders empty
//! - `field.nested` - a path starting at a top-level record field; the field must exist
//!
//! Interpolated values are HTML-escaped. Headers are interpolated with no
//! item and no index, so any placeholder in a header is an unknown binding.

use serde_json::Value;

use crate::record::{display_value, lookup_path, Record};
use crate::render::{escape_html, RenderNode};
use crate::template::{HeaderTemplate, RenderResult, RowTemplate, TemplateError};

const OPEN: &str = "${";
const CLOSE: char = '}';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Binding(Binding),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Binding {
    Index,
    Item,
    ItemPath(String),
    Field(String),
}

impl Binding {
    fn parse(name: &str) -> Self {
        match name {
            "index" => Binding::Index,
            "item" => Binding::Item,
            _ => match name.strip_prefix("item.") {
                Some(path) => Binding::ItemPath(path.to_string()),
                None => Binding::Field(name.to_string()),
            },
        }
    }

    fn name(&self) -> String {
        match self {
            Binding::Index => "index".to_string(),
            Binding::Item => "item".to_string(),
            Binding::ItemPath(path) => format!("item.{path}"),
            Binding::Field(path) => path.clone(),
        }
    }
}

/// Markup with `${binding}` placeholders, compiled once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupTemplate {
    source: String,
    compiled: Result<Vec<Segment>, TemplateError>,
}

impl MarkupTemplate {
    /// Compiles `source`. Syntax errors are kept and reported on every render.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = compile(&source);
        Self { source, compiled }
    }

    /// Compiles `source`, failing fast on syntax errors.
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let template = Self::new(source);
        template.compiled.as_ref().map_err(Clone::clone)?;
        Ok(template)
    }

    /// An empty template; renders nothing.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// The raw template source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the source is empty.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Names of all placeholders in source order.
    pub fn bindings(&self) -> Vec<String> {
        match &self.compiled {
            Ok(segments) => segments
                .iter()
                .filter_map(|segment| match segment {
                    Segment::Binding(binding) => Some(binding.name()),
                    Segment::Literal(_) => None,
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Interpolates the template against an optional item and index.
    pub fn interpolate(
        &self,
        item: Option<&Record>,
        index: Option<usize>,
    ) -> Result<String, TemplateError> {
        let segments = self.compiled.as_ref().map_err(Clone::clone)?;
        let mut out = String::with_capacity(self.source.len());
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Binding(binding) => {
                    let value = resolve(binding, item, index)?;
                    out.push_str(&escape_html(&value));
                }
            }
        }
        Ok(out)
    }
}

impl Default for MarkupTemplate {
    fn default() -> Self {
        Self::empty()
    }
}

impl RowTemplate<Record> for MarkupTemplate {
    fn render_row(&self, item: &Record, index: usize) -> RenderResult {
        self.interpolate(Some(item), Some(index)).map(RenderNode::Markup)
    }
}

impl HeaderTemplate for MarkupTemplate {
    fn render_header(&self) -> RenderResult {
        self.interpolate(None, None).map(RenderNode::Markup)
    }
}

fn compile(source: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut consumed = 0;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segments.push(Segment::Literal(rest[..start].to_string()));
        }
        let offset = consumed + start;
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            return Err(TemplateError::UnterminatedPlaceholder { offset });
        };
        let name = after_open[..end].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyPlaceholder { offset });
        }
        segments.push(Segment::Binding(Binding::parse(name)));

        let advance = start + OPEN.len() + end + 1;
        consumed += advance;
        rest = &rest[advance..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }
    Ok(segments)
}

fn resolve(
    binding: &Binding,
    item: Option<&Record>,
    index: Option<usize>,
) -> Result<String, TemplateError> {
    let unknown = || TemplateError::UnknownBinding {
        name: binding.name(),
    };

    match binding {
        Binding::Index => index.map(|i| i.to_string()).ok_or_else(unknown),
        Binding::Item => {
            let item = item.ok_or_else(unknown)?;
            let object: serde_json::Map<String, Value> =
                item.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            Ok(Value::Object(object).to_string())
        }
        Binding::ItemPath(path) => {
            let item = item.ok_or_else(unknown)?;
            Ok(lookup_path(item, path).map(display_value).unwrap_or_default())
        }
        Binding::Field(path) => {
            let item = item.ok_or_else(unknown)?;
            let root = path.split('.').next().unwrap_or(path);
            if !item.contains_key(root) {
                return Err(unknown());
            }
            Ok(lookup_path(item, path).map(display_value).unwrap_or_default())
        }
    }
}
