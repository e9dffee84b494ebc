use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Boxed source carried inside [`Error`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Output,
    Lookup,
    Queue,
    Pipeline,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Output => write!(f, "output"),
            ErrorKind::Lookup => write!(f, "lookup"),
            ErrorKind::Queue => write!(f, "queue"),
            ErrorKind::Pipeline => write!(f, "pipeline"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

pub struct ErrorInner {
    pub kind: ErrorKind,
    pub source: Option<BoxError>,
    pub message: Option<String>,
}

pub struct Error {
    pub inner: Box<ErrorInner>,
}

impl Error {
    pub fn new<E>(kind: ErrorKind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(ErrorInner {
                kind,
                source: source.map(Into::into),
                message: None,
            }),
        }
    }

    pub fn with_message<E>(kind: ErrorKind, message: impl Into<String>, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(ErrorInner {
                kind,
                source: source.map(Into::into),
                message: Some(message.into()),
            }),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn is_input(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Output)
    }

    pub fn is_lookup(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Lookup)
    }

    pub fn is_queue(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Queue)
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Pipeline)
    }

    pub fn is_config(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Config)
    }

    pub fn is_timeout(&self) -> bool {
        self.inner
            .source
            .as_ref()
            .and_then(|source| source.downcast_ref::<LookupError>())
            .is_some_and(|e| matches!(e, LookupError::Timeout(_)))
    }

    /// Downcasts the boxed source to one of the concern-specific enums.
    pub fn source_as<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.source.as_ref().and_then(|s| s.downcast_ref::<E>())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("sunset_pipeline::Error");
        f.field("kind", &self.inner.kind);
        if let Some(ref message) = self.inner.message {
            f.field("message", message);
        }
        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref message) = self.inner.message {
            write!(f, "{} error: {}", self.inner.kind, message)?;
        } else {
            write!(f, "{} error", self.inner.kind)?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|e| &**e as &(dyn StdError + 'static))
    }
}

impl From<InputError> for Error {
    fn from(err: InputError) -> Self {
        Error::new(ErrorKind::Input, Some(err))
    }
}

impl From<OutputError> for Error {
    fn from(err: OutputError) -> Self {
        Error::new(ErrorKind::Output, Some(err))
    }
}

impl From<LookupError> for Error {
    fn from(err: LookupError) -> Self {
        Error::new(ErrorKind::Lookup, Some(err))
    }
}

impl From<QueueError> for Error {
    fn from(err: QueueError) -> Self {
        Error::new(ErrorKind::Queue, Some(err))
    }
}

impl From<PipelineError> for Error {
    fn from(err: PipelineError) -> Self {
        Error::new(ErrorKind::Pipeline, Some(err))
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::new(ErrorKind::Config, Some(err))
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed input: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("record {index}: hour {hour} is outside 0-23")]
    InvalidHour { index: usize, hour: u32 },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("invalid status: {0}")]
    InvalidStatus(u16),
    #[error("api returned status: {0}")]
    ApiStatus(String),
    #[error("decode error: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("response is missing {0}")]
    MissingField(&'static str),
    #[error("invalid sunset time {value:?}: {source}")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("sunset time {0:?} does not use two-digit minutes and seconds")]
    TimeLayout(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout(err)
        } else if err.is_decode() {
            LookupError::Decode(err)
        } else if let Some(status) = err.status() {
            LookupError::InvalidStatus(status.as_u16())
        } else {
            LookupError::Request(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("input already closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),
    #[error("aggregator stopped with {0} worker(s) still live")]
    AggregatorStalled(usize),
    #[error("aggregator is no longer accepting messages")]
    AggregatorClosed,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[source] toml::de::Error),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}
