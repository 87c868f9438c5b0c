use crate::state::FAILED_PLACEHOLDER;
use crate::{ImageData, PhotoId, PhotoRecord, PhotoState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GalleryViewModel {
    pub rows: Vec<PhotoRowView>,
    pub photo_count: usize,
    pub listing_loaded: bool,
    /// Listing failure surfaced to the user, if any.
    pub notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRowView {
    pub id: PhotoId,
    pub text: String,
    /// Filtered rendition, present only once the pipeline completed.
    pub image: Option<ImageData>,
    /// True while the photo still has pipeline work ahead of it.
    pub busy: bool,
    pub state: PhotoState,
}

impl PhotoRowView {
    pub(crate) fn for_record(record: &PhotoRecord) -> Self {
        let (text, image, busy) = match record.state() {
            PhotoState::New | PhotoState::Downloaded => (record.name().to_string(), None, true),
            PhotoState::Filtered => (record.name().to_string(), record.filtered().cloned(), false),
            PhotoState::Failed => (FAILED_PLACEHOLDER.to_string(), None, false),
        };
        Self {
            id: record.id(),
            text,
            image,
            busy,
            state: record.state(),
        }
    }
}
