//! Outcome of a single processor invocation.

use std::fmt;

/// An expected, recoverable processor failure.
#[derive(Debug)]
pub struct ProcessError {
    /// Human-readable message.
    pub message: String,
    /// Optional underlying error.
    pub source: Option<anyhow::Error>,
}

impl ProcessError {
    /// Creates a new process error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// What a processor reports back to the executor.
#[derive(Debug)]
pub enum ProcessResult {
    /// The document was processed.
    Success,
    /// The processor could not do its job; handled by the failure policy.
    Failure(ProcessError),
    /// The document should be discarded without further processing.
    Drop,
}

impl ProcessResult {
    /// Creates a success result.
    #[must_use]
    pub const fn success() -> Self {
        Self::Success
    }

    /// Creates a failure result with a message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(ProcessError::new(message))
    }

    /// Creates a failure result with a message and an underlying error.
    #[must_use]
    pub fn failure_with(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Failure(ProcessError::new(message).with_source(source))
    }

    /// Creates a drop result.
    #[must_use]
    pub const fn drop_document() -> Self {
        Self::Drop
    }

    /// Returns true on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true on failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns true if the document should be dropped.
    #[must_use]
    pub const fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&ProcessError> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }
}
