//! Change events and the batches a source yields.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Classification of a change. Fixed for the life of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventAction::Create => "CREATE",
            EventAction::Update => "UPDATE",
            EventAction::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

/// One unit yielded by an event source: an action plus the ordered domain
/// objects it applies to.
///
/// Objects are opaque to the engine; how they are rendered on the wire is
/// the transport's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    action: EventAction,
    objects: Vec<JsonValue>,
}

impl EventBatch {
    /// Creates a batch for the given action.
    pub fn new(action: EventAction, objects: Vec<JsonValue>) -> Self {
        Self { action, objects }
    }

    /// The change classification of every object in this batch.
    pub fn action(&self) -> EventAction {
        self.action
    }

    /// Objects in production order.
    pub fn objects(&self) -> &[JsonValue] {
        &self.objects
    }

    /// Consumes the batch, returning its objects.
    pub fn into_objects(self) -> Vec<JsonValue> {
        self.objects
    }

    /// Number of objects in the batch.
    pub fn size(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns a copy carrying only the objects matching `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&JsonValue) -> bool,
    {
        Self {
            action: self.action,
            objects: self.objects.iter().filter(|o| keep(o)).cloned().collect(),
        }
    }

    /// Splits off up to `max` leading objects into a new batch with the
    /// same action, leaving the rest in `self`.
    pub fn take_front(&mut self, max: usize) -> Self {
        let n = max.min(self.objects.len());
        Self {
            action: self.action,
            objects: self.objects.drain(..n).collect(),
        }
    }

    /// Replaces the objects, keeping the action.
    pub fn with_objects(mut self, objects: Vec<JsonValue>) -> Self {
        self.objects = objects;
        self
    }

    /// Replaces the action.
    ///
    /// Transform hooks may call this, but the engine puts the produced
    /// action back before dispatch.
    pub fn with_action(mut self, action: EventAction) -> Self {
        self.action = action;
        self
    }

    /// Resets the action to `action`, returning true if it had changed.
    pub(crate) fn restore_action(&mut self, action: EventAction) -> bool {
        let changed = self.action != action;
        self.action = action;
        changed
    }
}
