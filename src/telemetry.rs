//! Telemetry - shared capture service
//!
//! Owns the event store, the mode registry and the producer taps built from
//! one [`TelemetryConfig`]. Clone the `Arc`s it hands out to give producer
//! threads and consumer overlays access to the same repositories.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::TelemetryConfig;
use crate::events::{EventRecordStore, EventTap, PayloadRenderers};
use crate::export::{export_to_file, ExportResult, ExportSource};
use crate::modes::{ModeRegistry, ModeTap};
use crate::overlay::{EventOverlay, ModeOverlay};
use crate::types::EntityIdAllocator;

/// Event store, mode registry and their producer taps
#[derive(Debug)]
pub struct Telemetry {
    config: TelemetryConfig,
    events: Arc<EventRecordStore>,
    modes: Arc<ModeRegistry>,
    payloads: Arc<PayloadRenderers>,
    ids: Arc<EntityIdAllocator>,
    event_tap: EventTap,
    mode_tap: ModeTap,
}

impl Telemetry {
    /// Create a service with default configuration
    pub fn new() -> Self {
        Self::with_config(TelemetryConfig::default())
    }

    pub fn with_config(config: TelemetryConfig) -> Self {
        let events = Arc::new(EventRecordStore::new(config.events.capacity));
        let modes = Arc::new(ModeRegistry::with_aging_window(config.modes.aging_window()));
        let payloads = Arc::new(PayloadRenderers::new());
        let event_tap = EventTap::new(Arc::clone(&events), Arc::clone(&payloads), &config.events);
        let mode_tap = ModeTap::new(Arc::clone(&modes));

        info!(
            capacity = config.events.capacity,
            aging_ms = config.modes.aging_window_ms,
            verbose_prefixes = config.events.verbose_event_prefixes.len(),
            "telemetry initialized"
        );

        Self {
            config,
            events,
            modes,
            payloads,
            ids: Arc::new(EntityIdAllocator::new()),
            event_tap,
            mode_tap,
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventRecordStore> {
        &self.events
    }

    pub fn modes(&self) -> &Arc<ModeRegistry> {
        &self.modes
    }

    pub fn payloads(&self) -> &Arc<PayloadRenderers> {
        &self.payloads
    }

    /// Allocator for mode identities
    pub fn ids(&self) -> &Arc<EntityIdAllocator> {
        &self.ids
    }

    pub fn event_tap(&self) -> EventTap {
        self.event_tap.clone()
    }

    pub fn mode_tap(&self) -> ModeTap {
        self.mode_tap.clone()
    }

    /// Event overlay configured from this service's settings
    pub fn event_overlay(&self) -> EventOverlay {
        EventOverlay::new(Arc::clone(&self.events), &self.config.event_overlay)
    }

    /// Mode overlay configured from this service's settings
    pub fn mode_overlay(&self) -> ModeOverlay {
        ModeOverlay::new(Arc::clone(&self.modes), &self.config.mode_overlay)
    }

    /// Clear both repositories
    pub fn clear(&self) {
        self.events.clear();
        self.modes.clear();
    }

    pub fn export_events(&self, path: impl AsRef<Path>) -> ExportResult<usize> {
        export_to_file(ExportSource::Events(&self.events), path)
    }

    pub fn export_modes(&self, path: impl AsRef<Path>) -> ExportResult<usize> {
        export_to_file(ExportSource::Modes(&self.modes), path)
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
