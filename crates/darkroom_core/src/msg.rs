use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The listing collaborator delivered the remote photo listing.
    ListingLoaded(Vec<crate::ListingEntry>),
    /// The listing collaborator failed; population is abandoned.
    ListingFailed(String),
    /// The rendering surface reports which rows are currently visible.
    VisibleRowsChanged(BTreeSet<crate::PhotoId>),
    /// Continuous scroll motion began.
    DragStarted,
    /// The drag gesture ended; `decelerating` when motion carries on.
    DragEnded { decelerating: bool },
    /// Post-drag deceleration came to rest.
    DecelerationEnded,
    /// A stage task finished for a photo.
    StageFinished {
        id: crate::PhotoId,
        stage: crate::Stage,
        outcome: crate::StageOutcome,
    },
}
