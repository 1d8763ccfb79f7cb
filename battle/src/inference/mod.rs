//! Hidden-information inference: possibility classes, sub-reasons and their arena

mod arena;
mod possibility;
mod reason;

pub use arena::{ClassId, Inference};
pub use possibility::{PossibilityClass, Resolution, Watch, WatchId};
pub use reason::{Deferred, ReasonState, Reasons, SubReason, all_of, given};
