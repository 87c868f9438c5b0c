//! Darkroom engine: pipeline execution, fetching and filtering.

mod engine;
mod fetch;
mod filename;
mod filter;
mod listing;
mod persist;
mod queue;
mod task;
mod types;

pub use engine::{PipelineCommand, PipelineHandle, PipelineSettings};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::photo_filename;
pub use filter::{PhotoFilter, SepiaFilter};
pub use listing::{fetch_listing, parse_listing};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use queue::StageQueue;
pub use task::StageWork;
pub use types::{FailureKind, ListingEntry, PhotoId, PipelineEvent, Stage, StageError, TaskOutcome};
