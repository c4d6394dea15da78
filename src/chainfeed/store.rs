//! # Store handle
//!
//! The single owned entry point consumers hold. A [`Store`] keeps the
//! current [`Document`] and funnels every write through [`Store::dispatch`],
//! so transitions apply in the total order the owner establishes. Readers
//! take [`Store::snapshot`] clones (structurally shared, never invalidated
//! by later writes) or borrow the live document directly.
//!
//! There is no global instance: whoever needs the store gets handed one.
//! The clock used for fetch bookkeeping is injected so that every
//! transition stays deterministic under test.

use chrono::{DateTime, Utc};

use crate::action::{Action, ActionEnvelope};
use crate::document::Document;
use crate::error::Result;
use crate::reducer;

/// Time source for `last_fetch` stamps.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Holds the current document and applies actions to it.
pub struct Store {
    current: Document,
    clock: Clock,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// A store over the default document (`{status: {}}`).
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// A store resuming from an existing snapshot.
    pub fn with_document(current: Document) -> Self {
        Store {
            current,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the time source (tests pin this to a fixed instant).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Borrow the live document for path-based reads.
    pub fn document(&self) -> &Document {
        &self.current
    }

    /// A structurally-shared copy of the current snapshot. Cheap; holders
    /// observe a stable view regardless of later dispatches.
    pub fn snapshot(&self) -> Document {
        self.current.clone()
    }

    /// Apply one typed action and publish the new snapshot.
    pub fn dispatch(&mut self, action: &Action) {
        log::debug!("applying {}", action.kind());
        self.current = reducer::apply_at(&self.current, action, (self.clock)());
    }

    /// Decode and apply a wire envelope. Unknown tags leave the document
    /// unchanged; malformed payloads for known tags are boundary errors.
    pub fn dispatch_envelope(&mut self, envelope: &ActionEnvelope) -> Result<()> {
        match Action::decode(envelope)? {
            Some(action) => self.dispatch(&action),
            None => log::trace!("ignoring unknown action `{}`", envelope.action_type),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn unknown_envelope_is_identity() {
        let mut store = Store::new();
        let before = store.snapshot();
        store
            .dispatch_envelope(&ActionEnvelope::new("user/LOGIN", json!({"who": "alice"})))
            .unwrap();
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn malformed_payload_leaves_document_untouched() {
        let mut store = Store::new();
        let before = store.snapshot();
        let result = store.dispatch_envelope(&ActionEnvelope::new(
            crate::action::SHOW_DIALOG,
            json!({"name": 42}),
        ));
        assert!(result.is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn snapshots_are_stable_across_dispatches() {
        let mut store = Store::new();
        store
            .dispatch_envelope(&ActionEnvelope::new(
                crate::action::SHOW_DIALOG,
                json!({"name": "transfer", "params": {"to": "bob"}}),
            ))
            .unwrap();
        let shown = store.snapshot();
        store
            .dispatch_envelope(&ActionEnvelope::new(
                crate::action::HIDE_DIALOG,
                json!({"name": "transfer"}),
            ))
            .unwrap();
        // The old snapshot still sees the dialog; the live document does not.
        assert!(shown.active_dialog("transfer").is_some());
        assert!(store.document().active_dialog("transfer").is_none());
    }

    #[test]
    fn injected_clock_feeds_last_fetch() {
        let instant = Utc.with_ymd_and_hms(2020, 8, 15, 11, 2, 42).unwrap();
        let mut store = Store::new().with_clock(Box::new(move || instant));
        store
            .dispatch_envelope(&ActionEnvelope::new(
                crate::action::RECEIVE_DATA,
                json!({
                    "data": [],
                    "order": "trending",
                    "fetching": false,
                    "endOfData": true
                }),
            ))
            .unwrap();
        let status = store.document().fetch_status("", "trending").unwrap();
        assert_eq!(
            status.get("last_fetch"),
            Some(&Value::from(instant.to_rfc3339()))
        );
    }
}
