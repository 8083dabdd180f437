//! Sync payload and remote document shapes.
//!
//! # Responsibility
//! - Define the full local snapshot pushed to the remote store.
//! - Define the partial document shape received from remote subscriptions.
//!
//! # Invariants
//! - Push always carries the full payload; merge semantics live remote-side.
//! - Pull treats absent fields as "leave local state alone".

use crate::model::note::Note;
use crate::model::task::Task;
use crate::model::timer::TimerSnapshot;
use serde::{Deserialize, Serialize};

/// Full local snapshot exchanged with the remote document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPayload {
    pub notes: Vec<Note>,
    pub tasks: Vec<Task>,
    pub tasks_completed: u32,
    pub timer: TimerSnapshot,
}

/// Per-user remote document as observed by a subscription.
///
/// Every field is optional: remote merge-writes touch only the fields they
/// carry, so a document written by an older client may lack some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks_completed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerSnapshot>,
}

impl RemoteDocument {
    /// Merges a pushed payload into this document, field by field.
    ///
    /// Last writer wins per field; fields the payload does not define do not
    /// exist, so a full-payload merge overwrites all four.
    pub fn merge_payload(&mut self, payload: &SyncPayload) {
        self.notes = Some(payload.notes.clone());
        self.tasks = Some(payload.tasks.clone());
        self.tasks_completed = Some(payload.tasks_completed);
        self.timer = Some(payload.timer);
    }

    /// Merges another partial document into this one, field by field.
    pub fn merge_document(&mut self, other: &RemoteDocument) {
        if let Some(notes) = &other.notes {
            self.notes = Some(notes.clone());
        }
        if let Some(tasks) = &other.tasks {
            self.tasks = Some(tasks.clone());
        }
        if let Some(completed) = other.tasks_completed {
            self.tasks_completed = Some(completed);
        }
        if let Some(timer) = other.timer {
            self.timer = Some(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteDocument, SyncPayload};
    use crate::model::note::Note;
    use crate::model::task::Task;
    use crate::model::timer::TimerSnapshot;

    fn sample_payload() -> SyncPayload {
        SyncPayload {
            notes: vec![Note::untitled(10)],
            tasks: vec![Task::new(20, "pack bags")],
            tasks_completed: 0,
            timer: TimerSnapshot::default(),
        }
    }

    #[test]
    fn payload_serializes_with_remote_field_names() {
        let json = serde_json::to_value(sample_payload()).expect("payload should serialize");
        let object = json.as_object().expect("payload should be an object");
        assert!(object.contains_key("notes"));
        assert!(object.contains_key("tasks"));
        assert!(object.contains_key("tasksCompleted"));
        assert!(object.contains_key("timer"));
    }

    #[test]
    fn merge_payload_overwrites_all_fields() {
        let mut document = RemoteDocument {
            tasks_completed: Some(9),
            ..RemoteDocument::default()
        };
        document.merge_payload(&sample_payload());
        assert_eq!(document.tasks_completed, Some(0));
        assert_eq!(document.notes.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn merge_document_leaves_absent_fields_untouched() {
        let mut document = RemoteDocument::default();
        document.merge_payload(&sample_payload());

        let partial = RemoteDocument {
            tasks: Some(vec![]),
            tasks_completed: Some(0),
            ..RemoteDocument::default()
        };
        document.merge_document(&partial);

        assert_eq!(document.tasks.as_ref().map(Vec::len), Some(0));
        assert_eq!(document.notes.as_ref().map(Vec::len), Some(1));
        assert!(document.timer.is_some());
    }

    #[test]
    fn absent_fields_are_omitted_from_serialized_documents() {
        let partial = RemoteDocument {
            timer: Some(TimerSnapshot::default()),
            ..RemoteDocument::default()
        };
        let json = serde_json::to_value(&partial).expect("document should serialize");
        let object = json.as_object().expect("document should be an object");
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("timer"));
    }
}
