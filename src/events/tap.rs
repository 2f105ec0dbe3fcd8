//! Producer-side entry point for event capture

use std::fmt::Display;
use std::sync::Arc;

use super::payload::PayloadRenderers;
use super::store::EventRecordStore;
use crate::config::EventsConfig;
use crate::types::{CallSite, EventDirection, EventRecord};
use crate::utils::time::current_timestamp;

/// Stamps, filters and records events into an [`EventRecordStore`]
#[derive(Debug, Clone)]
pub struct EventTap {
    store: Arc<EventRecordStore>,
    payloads: Arc<PayloadRenderers>,
    verbose_prefixes: Arc<[String]>,
    timestamp_format: Arc<str>,
}

impl EventTap {
    pub fn new(
        store: Arc<EventRecordStore>,
        payloads: Arc<PayloadRenderers>,
        config: &EventsConfig,
    ) -> Self {
        Self {
            store,
            payloads,
            verbose_prefixes: config.verbose_event_prefixes.iter().cloned().collect(),
            timestamp_format: Arc::from(config.timestamp_format.as_str()),
        }
    }

    pub fn store(&self) -> &Arc<EventRecordStore> {
        &self.store
    }

    /// False for events too chatty to record
    pub fn is_recordable(&self, event_name: &str) -> bool {
        !event_name.is_empty()
            && !self
                .verbose_prefixes
                .iter()
                .any(|prefix| event_name.starts_with(prefix.as_str()))
    }

    /// Record an event being posted. Returns false when it was filtered out.
    pub fn post(
        &self,
        event_name: &str,
        direction: EventDirection,
        call_site: CallSite,
        payload: Option<&dyn Display>,
    ) -> bool {
        if !self.is_recordable(event_name) {
            return false;
        }
        let payload = self.payloads.render(event_name, payload);
        self.store.add(EventRecord::posted(
            current_timestamp(&self.timestamp_format),
            event_name,
            direction,
            call_site,
            payload,
        ));
        true
    }

    /// Record an event being handled. Returns false when it was filtered out.
    pub fn received(&self, event_name: &str, call_site: CallSite) -> bool {
        if !self.is_recordable(event_name) {
            return false;
        }
        self.store.add(EventRecord::received(
            current_timestamp(&self.timestamp_format),
            event_name,
            call_site,
        ));
        true
    }
}
