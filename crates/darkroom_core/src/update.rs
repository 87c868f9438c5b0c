use crate::{Effect, GalleryState, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: GalleryState, msg: Msg) -> (GalleryState, Vec<Effect>) {
    let effects = match msg {
        Msg::ListingLoaded(entries) => state.apply_listing(entries),
        Msg::ListingFailed(message) => {
            state.apply_listing_failed(message);
            Vec::new()
        }
        Msg::VisibleRowsChanged(visible) => state.apply_window(visible),
        Msg::DragStarted => state.begin_drag(),
        Msg::DragEnded { decelerating } => state.end_drag(decelerating),
        Msg::DecelerationEnded => state.end_deceleration(),
        Msg::StageFinished { id, stage, outcome } => state.apply_stage_finished(id, stage, outcome),
    };

    (state, effects)
}
