use std::num::NonZeroUsize;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use pipeline_logging::pipeline_info;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::filter::{PhotoFilter, SepiaFilter};
use crate::listing::fetch_listing;
use crate::queue::StageQueue;
use crate::{FailureKind, PhotoId, PipelineEvent, Stage, StageError};

/// Tuning for the fetch layer and the two stage worker pools.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub fetch: FetchSettings,
    /// Concurrent downloads.
    pub download_width: usize,
    /// Concurrent filter jobs.
    pub filter_width: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let width = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(4);
        Self {
            fetch: FetchSettings::default(),
            download_width: width,
            filter_width: width,
        }
    }
}

pub enum PipelineCommand {
    FetchListing { url: String },
    StartDownload { id: PhotoId, url: String },
    StartFilter { id: PhotoId, image: Vec<u8> },
    CancelStage { id: PhotoId, stage: Stage },
    SetSuspended { suspended: bool },
}

/// Handle to the pipeline thread. Commands go in over one channel,
/// events come back on another. Dropping the handle closes the command
/// channel, which ends the pipeline thread and tears down its runtime
/// along with any tasks still running.
pub struct PipelineHandle {
    cmd_tx: mpsc::Sender<PipelineCommand>,
    event_rx: mpsc::Receiver<PipelineEvent>,
}

impl PipelineHandle {
    pub fn new(settings: PipelineSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_pipeline(settings, cmd_rx, event_tx));

        Self { cmd_tx, event_rx }
    }

    pub fn send(&self, command: PipelineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    pub fn try_recv(&self) -> Option<PipelineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<PipelineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

fn run_pipeline(
    settings: PipelineSettings,
    cmd_rx: mpsc::Receiver<PipelineCommand>,
    event_tx: mpsc::Sender<PipelineEvent>,
) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let _guard = runtime.enter();

    let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(settings.fetch.clone()));
    let filter: Arc<dyn PhotoFilter> = Arc::new(SepiaFilter::default());
    let downloads = StageQueue::spawn(Stage::Download, settings.download_width, event_tx.clone());
    let filters = StageQueue::spawn(Stage::Filter, settings.filter_width, event_tx.clone());

    pipeline_info!(
        "pipeline started ({} download workers, {} filter workers)",
        settings.download_width,
        settings.filter_width
    );

    while let Ok(command) = cmd_rx.recv() {
        match command {
            PipelineCommand::FetchListing { url } => {
                let fetch_settings = settings.fetch.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let event = match fetch_listing(&fetch_settings, &url).await {
                        Ok(entries) => PipelineEvent::ListingLoaded { entries },
                        Err(error) => PipelineEvent::ListingFailed { error },
                    };
                    let _ = event_tx.send(event);
                });
            }
            PipelineCommand::StartDownload { id, url } => {
                let fetcher = Arc::clone(&fetcher);
                downloads.submit(id, Box::pin(async move { fetcher.fetch(&url).await }));
            }
            PipelineCommand::StartFilter { id, image } => {
                let filter = Arc::clone(&filter);
                filters.submit(
                    id,
                    Box::pin(async move {
                        tokio::task::spawn_blocking(move || filter.apply(&image))
                            .await
                            .map_err(|err| StageError::new(FailureKind::Aborted, err.to_string()))?
                    }),
                );
            }
            PipelineCommand::CancelStage { id, stage } => match stage {
                Stage::Download => downloads.cancel(id),
                Stage::Filter => filters.cancel(id),
            },
            PipelineCommand::SetSuspended { suspended } => {
                downloads.set_suspended(suspended);
                filters.set_suspended(suspended);
            }
        }
    }

    pipeline_info!("pipeline command channel closed, shutting down");
}
