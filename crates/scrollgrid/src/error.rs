//! Error types for the grid container.

use scrollgrid_foundation::TemplateError;

/// Invalid [`GridConfig`](crate::GridConfig) value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("scroll offset must be a finite, non-negative pixel distance (got {0})")]
    InvalidScrollOffset(f32),
}

/// Failure reported by a fetch source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Captures the display form of any error.
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::new(err.to_string())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors surfaced by [`InfiniteGrid`](crate::InfiniteGrid).
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("invalid grid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The fetch source rejected a page. The cursor did not advance, so the
    /// next fetch asks for the same page again.
    #[error("fetching page {page} failed: {source}")]
    Fetch {
        page: usize,
        #[source]
        source: FetchError,
    },

    /// A header (`index: None`) or row template failed.
    #[error("rendering {} failed: {source}", render_target(.index))]
    Template {
        index: Option<usize>,
        #[source]
        source: TemplateError,
    },

    /// The host executor refused the fetch task.
    #[error("could not schedule fetch of page {page}: {reason}")]
    Spawn { page: usize, reason: String },
}

fn render_target(index: &Option<usize>) -> String {
    match index {
        Some(index) => format!("row {index}"),
        None => "header".to_string(),
    }
}

impl GridError {
    /// Whether this error came from the fetch path and can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GridError::Fetch { .. } | GridError::Spawn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = GridError::Fetch {
            page: 3,
            source: FetchError::new("timeout"),
        };
        assert_eq!(err.to_string(), "fetching page 3 failed: timeout");
        assert!(err.is_retryable());

        let err = GridError::Template {
            index: Some(2),
            source: TemplateError::render("bad"),
        };
        assert_eq!(err.to_string(), "rendering row 2 failed: bad");
        assert!(!err.is_retryable());

        let err = GridError::Template {
            index: None,
            source: TemplateError::render("bad"),
        };
        assert_eq!(err.to_string(), "rendering header failed: bad");
    }

    #[test]
    fn test_fetch_error_from_error() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
        assert_eq!(FetchError::from_error(&io).message(), "socket closed");
    }
}
