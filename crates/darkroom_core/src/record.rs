//! Photo records and the per-photo stage machine.

use std::fmt;
use std::sync::Arc;

use url::Url;

/// Stable identity of a photo, assigned in listing order.
pub type PhotoId = u64;

/// The two pipeline stages a photo passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Fetch the original bytes from the photo's URL.
    Download,
    /// Derive the filtered rendition from the downloaded bytes.
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

/// Lifecycle of a photo record. `Filtered` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoState {
    /// Listed but not yet downloaded.
    New,
    /// Original bytes are present, filtered rendition is not.
    Downloaded,
    /// Both renditions are present.
    Filtered,
    /// A stage failed; the record will not be retried.
    Failed,
}

/// Immutable image bytes, cheap to clone and share across threads.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData(Arc<[u8]>);

impl ImageData {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageData({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for ImageData {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Result of a finished stage task, as reported back to the update loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage produced its payload.
    Success(ImageData),
    /// The task observed its cancellation flag and discarded any work.
    Cancelled,
    /// The stage failed for the given reason.
    Failed(String),
}

/// One photo: identity, display name, source URL and the renditions
/// accumulated so far. Mutated only through the stage transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    id: PhotoId,
    name: String,
    url: Url,
    state: PhotoState,
    original: Option<ImageData>,
    filtered: Option<ImageData>,
}

impl PhotoRecord {
    pub(crate) fn new(id: PhotoId, name: String, url: Url) -> Self {
        Self {
            id,
            name,
            url,
            state: PhotoState::New,
            original: None,
            filtered: None,
        }
    }

    pub fn id(&self) -> PhotoId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn state(&self) -> PhotoState {
        self.state
    }

    pub fn original(&self) -> Option<&ImageData> {
        self.original.as_ref()
    }

    pub fn filtered(&self) -> Option<&ImageData> {
        self.filtered.as_ref()
    }

    pub(crate) fn apply_download(&mut self, image: ImageData) {
        self.original = Some(image);
        self.state = PhotoState::Downloaded;
    }

    pub(crate) fn apply_filter(&mut self, image: ImageData) {
        self.filtered = Some(image);
        self.state = PhotoState::Filtered;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.state = PhotoState::Failed;
    }
}
