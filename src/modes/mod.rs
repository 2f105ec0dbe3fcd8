//! Mode tracking: the sorted registry, the aging clock and the producer tap.

mod aging;
mod registry;
mod tap;

pub use aging::{AgingClock, AgingPhase, DEFAULT_AGING_WINDOW};
pub use registry::{compare_modes, ModeRegistry};
pub use tap::ModeTap;
