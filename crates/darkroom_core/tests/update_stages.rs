use std::sync::Once;

use darkroom_core::{
    update, Effect, GalleryState, ImageData, ListingEntry, Msg, PhotoId, PhotoState, Stage,
    StageOutcome, FAILED_PLACEHOLDER,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pipeline_logging::initialize_for_tests);
}

fn loaded_gallery(names: &[&str]) -> GalleryState {
    let entries = names
        .iter()
        .map(|name| ListingEntry::new(*name, format!("https://photos.example/{name}.png")))
        .collect();
    let (mut state, effects) = update(GalleryState::new(), Msg::ListingLoaded(entries));
    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    state
}

fn show(state: GalleryState, ids: &[PhotoId]) -> (GalleryState, Vec<Effect>) {
    update(state, Msg::VisibleRowsChanged(ids.iter().copied().collect()))
}

fn finished(id: PhotoId, stage: Stage, outcome: StageOutcome) -> Msg {
    Msg::StageFinished { id, stage, outcome }
}

#[test]
fn visible_download_chains_into_the_filter_stage() {
    init_logging();
    let original = ImageData::new(vec![5u8; 32]);
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);

    let (mut state, effects) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(original.clone())),
    );

    assert_eq!(
        effects,
        vec![Effect::StartFilter {
            id: 1,
            image: original.clone(),
        }]
    );
    let record = state.photo(1).cloned();
    assert_eq!(record.as_ref().map(|r| r.state()), Some(PhotoState::Downloaded));
    assert_eq!(record.and_then(|r| r.original().cloned()), Some(original));
    assert_eq!(state.filters_in_flight().iter().copied().collect::<Vec<_>>(), vec![1]);
    assert!(state.consume_dirty());
}

#[test]
fn filter_success_reaches_the_terminal_state() {
    init_logging();
    let original = ImageData::new(vec![5u8; 32]);
    let sepia = ImageData::new(vec![6u8; 32]);
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = update(state, finished(1, Stage::Download, StageOutcome::Success(original)));

    let (mut state, effects) = update(
        state,
        finished(1, Stage::Filter, StageOutcome::Success(sepia.clone())),
    );

    assert!(effects.is_empty());
    assert!(state.filters_in_flight().is_empty());
    assert!(state.all_settled());
    let view = state.view();
    assert_eq!(view.rows[0].state, PhotoState::Filtered);
    assert_eq!(view.rows[0].image, Some(sepia));
    assert_eq!(view.rows[0].text, "a");
    assert!(!view.rows[0].busy);
    assert!(state.consume_dirty());
}

#[test]
fn download_failure_is_terminal() {
    init_logging();
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);

    let (mut state, effects) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Failed("status 404".into())),
    );

    assert!(effects.is_empty());
    assert!(state.downloads_in_flight().is_empty());
    let view = state.view();
    assert_eq!(view.rows[0].state, PhotoState::Failed);
    assert_eq!(view.rows[0].text, FAILED_PLACEHOLDER);
    assert_eq!(view.rows[0].image, None);
    assert!(!view.rows[0].busy);
    assert!(state.consume_dirty());
    assert!(state.all_settled());
}

#[test]
fn filter_failure_is_terminal() {
    init_logging();
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(ImageData::new(vec![5u8; 32]))),
    );

    let (state, effects) = update(
        state,
        finished(1, Stage::Filter, StageOutcome::Failed("decode failed".into())),
    );

    assert!(effects.is_empty());
    assert_eq!(state.photo(1).map(|record| record.state()), Some(PhotoState::Failed));
    // The original bytes stay with the record even though the filter failed.
    assert!(state.photo(1).and_then(|record| record.original()).is_some());
}

#[test]
fn cancelled_outcome_leaves_the_record_untouched() {
    init_logging();
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = show(state, &[]);

    let (mut state, effects) = update(state, finished(1, Stage::Download, StageOutcome::Cancelled));

    assert!(effects.is_empty());
    assert_eq!(state.photo(1).map(|record| record.state()), Some(PhotoState::New));
    assert!(!state.consume_dirty());
}

#[test]
fn late_success_after_cancellation_is_dropped() {
    init_logging();
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = show(state, &[]);

    let (mut state, effects) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(ImageData::new(vec![5u8; 32]))),
    );

    assert!(effects.is_empty());
    assert_eq!(state.photo(1).map(|record| record.state()), Some(PhotoState::New));
    assert!(state.photo(1).and_then(|record| record.original()).is_none());
    assert!(!state.consume_dirty());
}

#[test]
fn cancelled_report_does_not_untrack_a_restarted_task() {
    init_logging();
    let original = ImageData::new(vec![5u8; 32]);
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = show(state, &[]);
    // The row scrolls back in before the cancelled task has reported.
    let (state, effects) = show(state, &[1]);
    assert_eq!(effects.len(), 1);

    let (state, effects) = update(state, finished(1, Stage::Download, StageOutcome::Cancelled));
    assert!(effects.is_empty());
    assert_eq!(state.downloads_in_flight().iter().copied().collect::<Vec<_>>(), vec![1]);

    // The restarted task's own completion still lands.
    let (state, effects) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(original.clone())),
    );
    assert_eq!(
        effects,
        vec![Effect::StartFilter {
            id: 1,
            image: original,
        }]
    );
    assert_eq!(state.photo(1).map(|record| record.state()), Some(PhotoState::Downloaded));
}

#[test]
fn duplicate_completion_is_ignored() {
    init_logging();
    let original = ImageData::new(vec![5u8; 32]);
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(original.clone())),
    );

    let (state, effects) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(original)),
    );

    assert!(effects.is_empty());
    assert_eq!(state.photo(1).map(|record| record.state()), Some(PhotoState::Downloaded));
}
