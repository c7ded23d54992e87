//! EventTrace — A recorded sequence of engine events for a session
//!
//! Traces are what tests and the batch simulator inspect to check event
//! ordering, and what tools export as JSON.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bus::{EventBus, SubscriptionId};
use crate::event::EngineEvent;
use crate::taxonomy::{EventCategory, EventKind};

/// Trace errors
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid trace JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An event with its position in the trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// 0-based position in the trace
    pub sequence: u64,
    pub event: EngineEvent,
    pub recorded_at: DateTime<Utc>,
}

/// A complete trace of engine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Game identifier
    pub game_id: String,

    /// All events in emission order
    pub events: Vec<RecordedEvent>,

    /// When recording started
    pub started_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl EventTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>, game_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            game_id: game_id.into(),
            events: Vec::new(),
            started_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Append an event
    pub fn push(&mut self, event: EngineEvent) {
        let sequence = self.events.len() as u64;
        self.events.push(RecordedEvent {
            sequence,
            event,
            recorded_at: Utc::now(),
        });
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate the bare events
    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter().map(|r| &r.event)
    }

    /// Event kinds in order
    pub fn kinds(&self) -> Vec<EventKind> {
        self.iter().map(EngineEvent::kind).collect()
    }

    /// Get events of one kind
    pub fn events_of(&self, kind: EventKind) -> Vec<&EngineEvent> {
        self.iter().filter(|e| e.kind() == kind).collect()
    }

    /// Get events by category
    pub fn events_by_category(&self, category: EventCategory) -> Vec<&EngineEvent> {
        self.iter().filter(|e| e.category() == category).collect()
    }

    /// Count events of one kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.iter().filter(|e| e.kind() == kind).count()
    }

    /// Check if trace contains an event kind
    pub fn has(&self, kind: EventKind) -> bool {
        self.iter().any(|e| e.kind() == kind)
    }

    /// Sum of all `TumbleWin` amounts
    pub fn total_tumble_win(&self) -> f64 {
        self.iter()
            .filter_map(|e| match e {
                EngineEvent::TumbleWin { amount } => Some(*amount),
                _ => None,
            })
            .sum()
    }

    /// Split into per-spin slices, each ending at a `SpinEnd`.
    ///
    /// Events after the last `SpinEnd` (bonus progress, bonus end) are
    /// attached to the spin they follow.
    pub fn spins(&self) -> Vec<Vec<&EngineEvent>> {
        let mut spins: Vec<Vec<&EngineEvent>> = Vec::new();
        let mut current: Vec<&EngineEvent> = Vec::new();
        for event in self.iter() {
            if matches!(event, EngineEvent::SpinStart) && !current.is_empty() {
                spins.push(std::mem::take(&mut current));
            }
            current.push(event);
        }
        if !current.is_empty() {
            spins.push(current);
        }
        spins
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Records every event published on a bus into a shared trace
#[derive(Debug, Clone)]
pub struct TraceRecorder {
    trace: Arc<Mutex<EventTrace>>,
}

impl TraceRecorder {
    /// Subscribe a new recorder to `bus`
    pub fn attach(bus: &mut EventBus, game_id: impl Into<String>) -> (Self, SubscriptionId) {
        let trace = Arc::new(Mutex::new(EventTrace::new(
            format!("trace-{}", Utc::now().timestamp_millis()),
            game_id,
        )));
        let sink = trace.clone();
        let id = bus.subscribe(move |event| sink.lock().push(event.clone()));
        (Self { trace }, id)
    }

    /// Copy of the trace so far
    pub fn snapshot(&self) -> EventTrace {
        self.trace.lock().clone()
    }

    /// Event kinds recorded so far
    pub fn kinds(&self) -> Vec<EventKind> {
        self.trace.lock().kinds()
    }

    /// Take the recorded events, leaving the trace empty
    pub fn drain(&self) -> Vec<EngineEvent> {
        let mut trace = self.trace.lock();
        std::mem::take(&mut trace.events)
            .into_iter()
            .map(|r| r.event)
            .collect()
    }
}
