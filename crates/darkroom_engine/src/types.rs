use std::fmt;

pub type PhotoId = u64;

/// The two worker pools a photo's tasks run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Filter,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Download => write!(f, "download"),
            Stage::Filter => write!(f, "filter"),
        }
    }
}

/// One name/URL pair from the remote photo listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub url: String,
}

/// Terminal report of a stage task. Exactly one is emitted per submitted
/// task, including tasks cancelled while still pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The stage produced its output bytes.
    Completed(Vec<u8>),
    /// The task observed its cancellation flag; any result was discarded.
    Cancelled,
    /// The stage failed.
    Failed(StageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    ListingLoaded {
        entries: Vec<ListingEntry>,
    },
    ListingFailed {
        error: StageError,
    },
    StageFinished {
        id: PhotoId,
        stage: Stage,
        outcome: TaskOutcome,
    },
}

/// Failure carried in events; kept comparable so callers and tests can
/// match on the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageError {
    pub kind: FailureKind,
    pub message: String,
}

impl StageError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
    Parse,
    Decode,
    Encode,
    Aborted,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Parse => write!(f, "listing parse error"),
            FailureKind::Decode => write!(f, "image decode error"),
            FailureKind::Encode => write!(f, "image encode error"),
            FailureKind::Aborted => write!(f, "worker aborted"),
        }
    }
}
