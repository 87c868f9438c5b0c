use std::sync::Once;

use darkroom_core::{
    update, Effect, GalleryState, ImageData, ListingEntry, Msg, PhotoId, PhotoState, Stage,
    StageOutcome,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pipeline_logging::initialize_for_tests);
}

fn photo_url(name: &str) -> String {
    format!("https://photos.example/{name}.png")
}

fn loaded_gallery(names: &[&str]) -> GalleryState {
    let entries = names
        .iter()
        .map(|name| ListingEntry::new(*name, photo_url(name)))
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
fn entering_rows_start_downloads() {
    init_logging();
    let state = loaded_gallery(&["a", "b", "c", "d"]);

    let (state, effects) = show(state, &[1, 2]);

    assert_eq!(
        effects,
        vec![
            Effect::StartDownload {
                id: 1,
                url: photo_url("a"),
            },
            Effect::StartDownload {
                id: 2,
                url: photo_url("b"),
            },
        ]
    );
    assert_eq!(state.downloads_in_flight().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn unchanged_window_emits_nothing() {
    init_logging();
    let state = loaded_gallery(&["a", "b"]);
    let (state, _) = show(state, &[1, 2]);

    let (_state, effects) = show(state, &[1, 2]);

    assert!(effects.is_empty());
}

#[test]
fn window_shift_cancels_leavers_before_starting_entrants() {
    init_logging();
    let state = loaded_gallery(&["a", "b", "c"]);
    let (state, _) = show(state, &[1, 2]);

    let (state, effects) = show(state, &[2, 3]);

    assert_eq!(
        effects,
        vec![
            Effect::CancelStage {
                id: 1,
                stage: Stage::Download,
            },
            Effect::StartDownload {
                id: 3,
                url: photo_url("c"),
            },
        ]
    );
    assert_eq!(state.downloads_in_flight().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn empty_window_cancels_all_in_flight_work() {
    init_logging();
    let state = loaded_gallery(&["a", "b"]);
    let (state, _) = show(state, &[1, 2]);

    let (state, effects) = show(state, &[]);

    assert_eq!(
        effects,
        vec![
            Effect::CancelStage {
                id: 1,
                stage: Stage::Download,
            },
            Effect::CancelStage {
                id: 2,
                stage: Stage::Download,
            },
        ]
    );
    assert!(state.downloads_in_flight().is_empty());
}

#[test]
fn reentering_row_resumes_from_downloaded() {
    init_logging();
    let original = ImageData::new(vec![1u8; 16]);
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, effects) = update(
        state,
        finished(1, Stage::Download, StageOutcome::Success(original.clone())),
    );
    // Still visible, so the filter stage chains immediately.
    assert_eq!(
        effects,
        vec![Effect::StartFilter {
            id: 1,
            image: original.clone(),
        }]
    );

    let (state, effects) = show(state, &[]);
    assert_eq!(
        effects,
        vec![Effect::CancelStage {
            id: 1,
            stage: Stage::Filter,
        }]
    );

    let (state, effects) = show(state, &[1]);
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
fn settled_rows_are_left_alone() {
    init_logging();
    let state = loaded_gallery(&["a"]);
    let (state, _) = show(state, &[1]);
    let (state, _) = update(state, finished(1, Stage::Download, StageOutcome::Failed("status 404".into())));
    assert_eq!(state.photo(1).map(|record| record.state()), Some(PhotoState::Failed));

    let (state, effects) = show(state, &[]);
    assert!(effects.is_empty());

    let (_state, effects) = show(state, &[1]);
    assert!(effects.is_empty());
}

#[test]
fn unknown_visible_ids_are_ignored() {
    init_logging();
    let state = loaded_gallery(&["a"]);

    let (state, effects) = show(state, &[1, 99]);

    assert_eq!(
        effects,
        vec![Effect::StartDownload {
            id: 1,
            url: photo_url("a"),
        }]
    );
    assert!(state.photo(99).is_none());
}
