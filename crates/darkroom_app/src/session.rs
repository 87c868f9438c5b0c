use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use darkroom_core::{update, GalleryState, Msg, PhotoRecord, PhotoState};
use darkroom_engine::{photo_filename, AtomicFileWriter, PersistError, PipelineSettings};
use pipeline_logging::pipeline_info;
use thiserror::Error;

use crate::effects::EffectRunner;
use crate::render;
use crate::viewport::Viewport;

const EVENT_POLL: Duration = Duration::from_millis(20);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Rows on screen when the viewport is at rest.
const WINDOW_ROWS: usize = 4;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("photo listing failed: {0}")]
    Listing(String),
    #[error("timed out waiting for {0}")]
    Stalled(&'static str),
    #[error(transparent)]
    Export(#[from] PersistError),
}

#[derive(Debug)]
pub struct SessionSummary {
    pub photo_count: usize,
    pub filtered: usize,
    pub failed: usize,
    pub exported: Vec<PathBuf>,
}

/// Drives one scripted gallery session: load the listing, page through
/// the photos with drag/decelerate gestures, wait for each window to
/// settle, then export the filtered renditions.
pub fn run(listing_url: &str, output_dir: &Path) -> Result<SessionSummary, SessionError> {
    let mut session = Session::new(PipelineSettings::default());

    session.runner.fetch_listing(listing_url);
    session.pump_until("the photo listing", |state| {
        state.listing_loaded() || state.listing_error().is_some()
    })?;
    if let Some(message) = session.state.listing_error() {
        return Err(SessionError::Listing(message.to_string()));
    }

    let ids = session.state.photos().map(PhotoRecord::id).collect();
    let mut viewport = Viewport::new(ids, WINDOW_ROWS);

    session.apply(Msg::VisibleRowsChanged(viewport.visible()));
    session.pump_until("visible rows to settle", window_settled)?;

    while !viewport.at_bottom() {
        session.apply(Msg::DragStarted);
        viewport.scroll_by(WINDOW_ROWS - 1);
        session.apply(Msg::VisibleRowsChanged(viewport.visible()));
        session.apply(Msg::DragEnded { decelerating: true });
        viewport.scroll_by(1);
        session.apply(Msg::VisibleRowsChanged(viewport.visible()));
        session.apply(Msg::DecelerationEnded);
        session.pump_until("visible rows to settle", window_settled)?;
    }

    let exported = session.export(output_dir)?;

    let mut filtered = 0;
    let mut failed = 0;
    for record in session.state.photos() {
        match record.state() {
            PhotoState::Filtered => filtered += 1,
            PhotoState::Failed => failed += 1,
            PhotoState::New | PhotoState::Downloaded => {}
        }
    }
    pipeline_info!(
        "session done: {filtered} filtered, {failed} failed, {} exported",
        exported.len()
    );

    Ok(SessionSummary {
        photo_count: session.state.photo_count(),
        filtered,
        failed,
        exported,
    })
}

struct Session {
    state: GalleryState,
    runner: EffectRunner,
}

impl Session {
    fn new(settings: PipelineSettings) -> Self {
        Self {
            state: GalleryState::new(),
            runner: EffectRunner::new(settings),
        }
    }

    /// Runs one message through the pure update, executes its effects and
    /// renders when the state changed.
    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.run(effects);
        let view = state.view();
        if state.consume_dirty() {
            print!("{}", render::render(&view));
        }
        self.state = state;
    }

    /// Feeds pipeline events into the update loop until the predicate
    /// holds.
    fn pump_until(
        &mut self,
        what: &'static str,
        done: impl Fn(&GalleryState) -> bool,
    ) -> Result<(), SessionError> {
        let deadline = Instant::now() + SETTLE_TIMEOUT;
        while !done(&self.state) {
            if Instant::now() >= deadline {
                return Err(SessionError::Stalled(what));
            }
            if let Some(msg) = self.runner.poll(EVENT_POLL) {
                self.apply(msg);
            }
        }
        Ok(())
    }

    fn export(&self, output_dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
        let writer = AtomicFileWriter::new(output_dir.to_path_buf());
        let mut exported = Vec::new();
        for record in self.state.photos() {
            if let Some(image) = record.filtered() {
                let filename = photo_filename(record.name(), record.url().as_str());
                exported.push(writer.write(&filename, image.as_bytes())?);
            }
        }
        Ok(exported)
    }
}

/// True once every visible row reached a terminal state.
fn window_settled(state: &GalleryState) -> bool {
    state.visible().iter().all(|id| {
        state.photo(*id).map_or(true, |record| {
            matches!(record.state(), PhotoState::Filtered | PhotoState::Failed)
        })
    })
}
