//! Checklist task model.
//!
//! # Invariants
//! - `id` is the creation timestamp in epoch milliseconds, unique within the
//!   task collection.
//! - Serialized shape is exactly `{id, text, completed}`.

use serde::{Deserialize, Serialize};

/// One checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Creation-time id, unique within the collection.
    pub id: i64,
    /// User-entered task text, stored verbatim.
    pub text: String,
    /// Checked-off state; counted into the completion counter.
    pub completed: bool,
}

impl Task {
    /// Creates an unchecked task.
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }
}
