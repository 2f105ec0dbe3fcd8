//! Event capture: the bounded record store, payload rendering and the
//! producer tap.

mod payload;
mod store;
mod tap;

pub use payload::{looks_like_type_path, render_generic, PayloadRenderers, EMPTY_PAYLOAD, NULL_PAYLOAD};
pub use store::EventRecordStore;
pub use tap::EventTap;
