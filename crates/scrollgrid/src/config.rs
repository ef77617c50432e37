//! Grid configuration.

use crate::error::ConfigError;

/// Default distance from the bottom, in pixels, that triggers a prefetch.
pub const DEFAULT_SCROLL_OFFSET: f32 = 50.0;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Paging and prefetch configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Remaining scroll distance below which the next page is requested.
    pub scroll_offset: f32,

    /// Number of items requested per fetch.
    pub page_size: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            scroll_offset: DEFAULT_SCROLL_OFFSET,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl GridConfig {
    /// Creates a configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the prefetch threshold in pixels.
    pub fn with_scroll_offset(mut self, scroll_offset: f32) -> Self {
        self.scroll_offset = scroll_offset;
        self
    }

    /// Checks every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_page_size(self.page_size)?;
        validate_scroll_offset(self.scroll_offset)
    }
}

pub(crate) fn validate_page_size(page_size: usize) -> Result<(), ConfigError> {
    if page_size == 0 {
        return Err(ConfigError::ZeroPageSize);
    }
    Ok(())
}

pub(crate) fn validate_scroll_offset(scroll_offset: f32) -> Result<(), ConfigError> {
    if !scroll_offset.is_finite() || scroll_offset < 0.0 {
        return Err(ConfigError::InvalidScrollOffset(scroll_offset));
    }
    Ok(())
}
