use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    analysis::search_model::SearchPhase,
    device::device_model::DragGesture,
    tree::{identity::UniqueId, snapshot::Snapshot},
};

/// One step of a scroll search, written as a JSON line.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub serial: String,
    pub target: String,

    pub phase: String,

    pub generation: Option<u64>,
    pub fingerprint: Option<String>,

    pub drag: Option<DragGesture>,
    pub occluders: Vec<String>,
    pub note: Option<String>,
}

impl TraceEvent {
    pub fn now(serial: &str, target: &UniqueId, phase: SearchPhase) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            serial: serial.to_string(),
            target: target.to_string(),
            phase: format!("{:?}", phase),
            generation: None,
            fingerprint: None,
            drag: None,
            occluders: vec![],
            note: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: &Snapshot) -> Self {
        self.generation = Some(snapshot.generation());
        self.fingerprint = Some(snapshot.fingerprint());
        self
    }

    pub fn with_drag(mut self, gesture: &DragGesture) -> Self {
        self.drag = Some(gesture.clone());
        self
    }

    pub fn with_occluders<'a>(mut self, ids: impl IntoIterator<Item = &'a UniqueId>) -> Self {
        self.occluders = ids.into_iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn with_note(mut self, note: impl ToString) -> Self {
        self.note = Some(note.to_string());
        self
    }
}
