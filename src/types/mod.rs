//! Data types shared by the repositories, formatter and overlays

mod event;
mod identity;
mod mode;

pub use event::{CallSite, EventAction, EventDirection, EventRecord};
pub use identity::{EntityId, EntityIdAllocator};
pub use mode::{ModeMetadata, ModeRecord};
