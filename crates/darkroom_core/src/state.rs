use std::collections::{BTreeMap, BTreeSet};

use pipeline_logging::{pipeline_debug, pipeline_warn};

use crate::listing::records_from_listing;
use crate::record::{ImageData, PhotoId, PhotoRecord, PhotoState, Stage, StageOutcome};
use crate::view_model::{GalleryViewModel, PhotoRowView};
use crate::{Effect, ListingEntry};

/// Placeholder text rendered for photos whose pipeline failed.
pub const FAILED_PLACEHOLDER: &str = "Failed to load";

/// The whole gallery: photo records plus the bookkeeping that drives
/// window scheduling. The in-flight sets are the single source of truth
/// for which stage tasks exist; a completion whose id is no longer in
/// its set was cancelled and must not touch the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryState {
    photos: BTreeMap<PhotoId, PhotoRecord>,
    downloads_in_flight: BTreeSet<PhotoId>,
    filters_in_flight: BTreeSet<PhotoId>,
    visible: BTreeSet<PhotoId>,
    scrolling: bool,
    /// Ids are never reused across listing reloads, so a completion from
    /// an earlier listing can never be mistaken for a current task.
    next_photo_id: PhotoId,
    listing_loaded: bool,
    listing_error: Option<String>,
    dirty: bool,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            photos: BTreeMap::new(),
            downloads_in_flight: BTreeSet::new(),
            filters_in_flight: BTreeSet::new(),
            visible: BTreeSet::new(),
            scrolling: false,
            next_photo_id: 1,
            listing_loaded: false,
            listing_error: None,
            dirty: false,
        }
    }
}

impl GalleryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> GalleryViewModel {
        GalleryViewModel {
            rows: self.photos.values().map(PhotoRowView::for_record).collect(),
            photo_count: self.photos.len(),
            listing_loaded: self.listing_loaded,
            notice: self.listing_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn photo(&self, id: PhotoId) -> Option<&PhotoRecord> {
        self.photos.get(&id)
    }

    /// Records in id (listing) order.
    pub fn photos(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.photos.values()
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn listing_loaded(&self) -> bool {
        self.listing_loaded
    }

    pub fn listing_error(&self) -> Option<&str> {
        self.listing_error.as_deref()
    }

    pub fn downloads_in_flight(&self) -> &BTreeSet<PhotoId> {
        &self.downloads_in_flight
    }

    pub fn filters_in_flight(&self) -> &BTreeSet<PhotoId> {
        &self.filters_in_flight
    }

    pub fn visible(&self) -> &BTreeSet<PhotoId> {
        &self.visible
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// True when every record has reached a terminal state.
    pub fn all_settled(&self) -> bool {
        self.photos
            .values()
            .all(|record| matches!(record.state(), PhotoState::Filtered | PhotoState::Failed))
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Replaces the photo collection. Any in-flight work belongs to the
    /// previous listing and is cancelled; the visible window is cleared
    /// until the rendering surface reports it for the new rows.
    pub(crate) fn apply_listing(&mut self, entries: Vec<ListingEntry>) -> Vec<Effect> {
        let effects = self.cancel_all_in_flight();
        let (photos, next_id) = records_from_listing(entries, self.next_photo_id);
        self.photos = photos;
        self.next_photo_id = next_id;
        self.visible.clear();
        self.listing_loaded = true;
        self.listing_error = None;
        self.mark_dirty();
        effects
    }

    pub(crate) fn apply_listing_failed(&mut self, message: String) {
        pipeline_warn!("photo listing failed: {message}");
        self.listing_error = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn apply_window(&mut self, visible: BTreeSet<PhotoId>) -> Vec<Effect> {
        self.visible = visible;
        if self.scrolling {
            return Vec::new();
        }
        self.refresh_window()
    }

    pub(crate) fn begin_drag(&mut self) -> Vec<Effect> {
        self.scrolling = true;
        vec![Effect::SuspendQueues]
    }

    pub(crate) fn end_drag(&mut self, decelerating: bool) -> Vec<Effect> {
        if decelerating {
            return Vec::new();
        }
        self.settle()
    }

    pub(crate) fn end_deceleration(&mut self) -> Vec<Effect> {
        self.settle()
    }

    pub(crate) fn apply_stage_finished(
        &mut self,
        id: PhotoId,
        stage: Stage,
        outcome: StageOutcome,
    ) -> Vec<Effect> {
        match outcome {
            StageOutcome::Cancelled => {
                // The cancel pass already unmapped this id; if an entry is
                // mapped now it belongs to a newer task for the same photo
                // and must stay.
                pipeline_debug!("{stage} for photo {id} reported cancelled");
                Vec::new()
            }
            StageOutcome::Success(image) => {
                if !self.untrack(id, stage) {
                    return Vec::new();
                }
                self.apply_stage_success(id, stage, image)
            }
            StageOutcome::Failed(message) => {
                if !self.untrack(id, stage) {
                    return Vec::new();
                }
                self.apply_stage_failure(id, stage, message)
            }
        }
    }

    /// Removes the id from the stage's in-flight set. A miss means a
    /// window pass cancelled the task after it finished its work, and the
    /// result must be discarded.
    fn untrack(&mut self, id: PhotoId, stage: Stage) -> bool {
        let tracked = match stage {
            Stage::Download => self.downloads_in_flight.remove(&id),
            Stage::Filter => self.filters_in_flight.remove(&id),
        };
        if !tracked {
            pipeline_debug!("dropping stale {stage} completion for photo {id}");
        }
        tracked
    }

    fn apply_stage_success(&mut self, id: PhotoId, stage: Stage, image: ImageData) -> Vec<Effect> {
        let Some(record) = self.photos.get_mut(&id) else {
            pipeline_warn!("{stage} finished for unknown photo {id}");
            return Vec::new();
        };
        match (stage, record.state()) {
            (Stage::Download, PhotoState::New) => {
                record.apply_download(image);
                self.mark_dirty();
                // A still-visible photo rolls straight into its filter
                // stage once the download lands.
                if self.visible.contains(&id) && !self.scrolling {
                    return self.start_filter(id);
                }
                Vec::new()
            }
            (Stage::Filter, PhotoState::Downloaded) => {
                record.apply_filter(image);
                self.mark_dirty();
                Vec::new()
            }
            (stage, state) => {
                pipeline_warn!("ignoring {stage} success for photo {id} in state {state:?}");
                Vec::new()
            }
        }
    }

    fn apply_stage_failure(&mut self, id: PhotoId, stage: Stage, message: String) -> Vec<Effect> {
        let Some(record) = self.photos.get_mut(&id) else {
            pipeline_warn!("{stage} failed for unknown photo {id}");
            return Vec::new();
        };
        match (stage, record.state()) {
            (Stage::Download, PhotoState::New) | (Stage::Filter, PhotoState::Downloaded) => {
                pipeline_warn!("photo {id} {stage} failed: {message}");
                record.mark_failed();
                self.mark_dirty();
            }
            (stage, state) => {
                pipeline_warn!("ignoring {stage} failure for photo {id} in state {state:?}");
            }
        }
        Vec::new()
    }

    /// Re-derives the in-flight sets from the visible window: cancel work
    /// for rows that scrolled out, start the pending stage for rows that
    /// scrolled in. Rows already working on the right stage are left alone.
    fn refresh_window(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();

        let in_flight: BTreeSet<PhotoId> = self
            .downloads_in_flight
            .union(&self.filters_in_flight)
            .copied()
            .collect();

        for id in in_flight.difference(&self.visible).copied() {
            if self.downloads_in_flight.remove(&id) {
                effects.push(Effect::CancelStage {
                    id,
                    stage: Stage::Download,
                });
            }
            if self.filters_in_flight.remove(&id) {
                effects.push(Effect::CancelStage {
                    id,
                    stage: Stage::Filter,
                });
            }
        }

        let to_start: Vec<PhotoId> = self.visible.difference(&in_flight).copied().collect();
        for id in to_start {
            effects.extend(self.dispatch(id));
        }

        effects
    }

    /// Starts whichever stage the record's state calls for. Terminal
    /// states are a logged no-op.
    fn dispatch(&mut self, id: PhotoId) -> Vec<Effect> {
        let Some(state) = self.photos.get(&id).map(PhotoRecord::state) else {
            pipeline_warn!("visible photo {id} has no record");
            return Vec::new();
        };
        match state {
            PhotoState::New => self.start_download(id),
            PhotoState::Downloaded => self.start_filter(id),
            PhotoState::Filtered | PhotoState::Failed => {
                pipeline_debug!("nothing to do for photo {id}");
                Vec::new()
            }
        }
    }

    fn start_download(&mut self, id: PhotoId) -> Vec<Effect> {
        if self.downloads_in_flight.contains(&id) {
            return Vec::new();
        }
        let Some(record) = self.photos.get(&id) else {
            return Vec::new();
        };
        if record.state() != PhotoState::New {
            return Vec::new();
        }
        let url = record.url().to_string();
        self.downloads_in_flight.insert(id);
        vec![Effect::StartDownload { id, url }]
    }

    fn start_filter(&mut self, id: PhotoId) -> Vec<Effect> {
        if self.filters_in_flight.contains(&id) {
            return Vec::new();
        }
        let Some(record) = self.photos.get(&id) else {
            return Vec::new();
        };
        if record.state() != PhotoState::Downloaded {
            return Vec::new();
        }
        let Some(image) = record.original().cloned() else {
            pipeline_warn!("photo {id} is downloaded but carries no bytes");
            return Vec::new();
        };
        self.filters_in_flight.insert(id);
        vec![Effect::StartFilter { id, image }]
    }

    fn settle(&mut self) -> Vec<Effect> {
        self.scrolling = false;
        let mut effects = self.refresh_window();
        effects.push(Effect::ResumeQueues);
        effects
    }

    fn cancel_all_in_flight(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        for id in std::mem::take(&mut self.downloads_in_flight) {
            effects.push(Effect::CancelStage {
                id,
                stage: Stage::Download,
            });
        }
        for id in std::mem::take(&mut self.filters_in_flight) {
            effects.push(Effect::CancelStage {
                id,
                stage: Stage::Filter,
            });
        }
        effects
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
