use thiserror::Error;

/// Failure of an `add_record` or `del_record` invocation.
///
/// Validation, resolution and not-found failures are terminal and never
/// touch the remote provider past the lookup. Remote failures carry the
/// DNS API client's error unchanged.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Resolution(String),

    #[error("{0}")]
    NotFound(String),

    #[error("DNS provider error: {0:#}")]
    Remote(#[from] anyhow::Error),
}

impl RecordError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
