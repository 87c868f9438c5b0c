//! Darkroom core: pure photo state machine and window scheduling.
mod effect;
mod listing;
mod msg;
mod record;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use listing::ListingEntry;
pub use msg::Msg;
pub use record::{ImageData, PhotoId, PhotoRecord, PhotoState, Stage, StageOutcome};
pub use state::{GalleryState, FAILED_PLACEHOLDER};
pub use update::update;
pub use view_model::{GalleryViewModel, PhotoRowView};
