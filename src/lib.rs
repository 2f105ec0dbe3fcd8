//! Tracked Telemetry
//!
//! Real-time capture of event traffic and mode state for on-screen debug
//! overlays. Producers on any thread record events and mode transitions;
//! consumers take consistent snapshots and render fixed-width lines.
//!
//! # Features
//!
//! - **Bounded event history**: O(1) ring buffer that overwrites the oldest record
//! - **Sorted mode registry**: priority-ordered, with a "just turned on" aging clock
//! - **Change notification**: coalesced callbacks plus a tokio `watch` channel
//! - **Line formatting**: width budgets with left truncation and `(xN)` consolidation
//! - **Export**: JSON Lines snapshots written atomically
//!
//! # Modules
//!
//! - `types`: Records, metadata and entity identities
//! - `events`: Event store, payload rendering and the producer tap
//! - `modes`: Mode registry, aging clock and the producer tap
//! - `notify`: Change notifier shared by both repositories
//! - `format`: Line rendering and duplicate consolidation
//! - `overlay`: Fixed-height view-models for display
//! - `config`: Configuration with environment overrides
//! - `export`: JSON Lines export
//! - `utils`: Timestamps and atomic file writes
//!
//! # Example
//!
//! ```no_run
//! use tracked_telemetry::{CallSite, EventDirection, ModeMetadata, Telemetry};
//!
//! let telemetry = Telemetry::new();
//! let events = telemetry.event_tap();
//! events.post("Evt_BallDrained", EventDirection::ToGui, CallSite::new("Trough", "OnSwitch"), Some(&3));
//!
//! let id = telemetry.ids().allocate();
//! telemetry.mode_tap().added(id, &ModeMetadata::new("Attract", "Game.Attract", 20));
//!
//! let mut overlay = telemetry.event_overlay();
//! overlay.refresh();
//! for line in overlay.lines() {
//!     println!("{}", line.text);
//! }
//! ```

pub mod config;
pub mod events;
pub mod export;
pub mod format;
pub mod modes;
pub mod notify;
pub mod overlay;
pub mod telemetry;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{ConfigError, TelemetryConfig};
pub use events::{EventRecordStore, EventTap, PayloadRenderers};
pub use export::{ExportError, ExportSource};
pub use format::{ConsolidationFormatter, EquivalencePolicy, RecordEquivalence};
pub use modes::{AgingClock, ModeRegistry, ModeTap};
pub use notify::{ChangeNotifier, SubscriptionId};
pub use overlay::{EventOverlay, EventTone, ModeOverlay, ModeTone, OverlayLine};
pub use telemetry::Telemetry;
pub use types::{
    CallSite, EntityId, EntityIdAllocator, EventAction, EventDirection, EventRecord,
    ModeMetadata, ModeRecord,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
