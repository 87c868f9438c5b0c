use std::time::Duration;

use darkroom_core::{Effect, ImageData, ListingEntry, Msg, StageOutcome};
use darkroom_engine::{
    PipelineCommand, PipelineEvent, PipelineHandle, PipelineSettings, TaskOutcome,
};
use pipeline_logging::pipeline_info;

/// Owns the pipeline handle: core effects go out as pipeline commands,
/// pipeline events come back as update messages.
pub(crate) struct EffectRunner {
    handle: PipelineHandle,
}

impl EffectRunner {
    pub(crate) fn new(settings: PipelineSettings) -> Self {
        Self {
            handle: PipelineHandle::new(settings),
        }
    }

    pub(crate) fn fetch_listing(&self, url: &str) {
        pipeline_info!("fetching photo listing from {url}");
        self.handle.send(PipelineCommand::FetchListing {
            url: url.to_string(),
        });
    }

    pub(crate) fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartDownload { id, url } => {
                    pipeline_info!("starting download for photo {id}");
                    self.handle.send(PipelineCommand::StartDownload { id, url });
                }
                Effect::StartFilter { id, image } => {
                    pipeline_info!("starting filter for photo {id}");
                    self.handle.send(PipelineCommand::StartFilter {
                        id,
                        image: image.as_bytes().to_vec(),
                    });
                }
                Effect::CancelStage { id, stage } => {
                    self.handle.send(PipelineCommand::CancelStage {
                        id,
                        stage: map_stage(stage),
                    });
                }
                Effect::SuspendQueues => {
                    self.handle
                        .send(PipelineCommand::SetSuspended { suspended: true });
                }
                Effect::ResumeQueues => {
                    self.handle
                        .send(PipelineCommand::SetSuspended { suspended: false });
                }
            }
        }
    }

    /// Waits up to `timeout` for the next pipeline event, already mapped
    /// into an update message.
    pub(crate) fn poll(&self, timeout: Duration) -> Option<Msg> {
        self.handle.recv_timeout(timeout).map(map_event)
    }
}

fn map_stage(stage: darkroom_core::Stage) -> darkroom_engine::Stage {
    match stage {
        darkroom_core::Stage::Download => darkroom_engine::Stage::Download,
        darkroom_core::Stage::Filter => darkroom_engine::Stage::Filter,
    }
}

fn map_event(event: PipelineEvent) -> Msg {
    match event {
        PipelineEvent::ListingLoaded { entries } => Msg::ListingLoaded(
            entries
                .into_iter()
                .map(|entry| ListingEntry::new(entry.name, entry.url))
                .collect(),
        ),
        PipelineEvent::ListingFailed { error } => Msg::ListingFailed(error.to_string()),
        PipelineEvent::StageFinished { id, stage, outcome } => Msg::StageFinished {
            id,
            stage: match stage {
                darkroom_engine::Stage::Download => darkroom_core::Stage::Download,
                darkroom_engine::Stage::Filter => darkroom_core::Stage::Filter,
            },
            outcome: map_outcome(outcome),
        },
    }
}

fn map_outcome(outcome: TaskOutcome) -> StageOutcome {
    match outcome {
        TaskOutcome::Completed(bytes) => StageOutcome::Success(ImageData::from(bytes)),
        TaskOutcome::Cancelled => StageOutcome::Cancelled,
        TaskOutcome::Failed(error) => StageOutcome::Failed(error.to_string()),
    }
}
