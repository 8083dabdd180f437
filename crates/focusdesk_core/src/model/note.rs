//! Multi-note model and patch shape.
//!
//! # Responsibility
//! - Define the persisted note record used by the note collection manager.
//! - Define the partial-update shape accepted by `NoteService::update`.
//!
//! # Invariants
//! - `id` is the creation timestamp in epoch milliseconds.
//! - Serialized shape is exactly `{id, title, body, updatedAt}`.

use serde::{Deserialize, Serialize};

/// One note in the collection. `body` holds markdown source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Creation-time id, unique within the collection.
    pub id: i64,
    pub title: String,
    /// Markdown source as edited; previews are derived, never stored.
    pub body: String,
    /// Last-modified time in epoch milliseconds.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl Note {
    /// Creates the default new note: "Untitled" with an empty body.
    pub fn untitled(id: i64) -> Self {
        Self {
            id,
            title: "Untitled".to_string(),
            body: String::new(),
            updated_at: id,
        }
    }
}

/// Partial update for a note; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NotePatch {
    pub fn title(value: impl Into<String>) -> Self {
        Self {
            title: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn body(value: impl Into<String>) -> Self {
        Self {
            body: Some(value.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Note;

    #[test]
    fn serialized_shape_matches_storage_contract() {
        let mut note = Note::untitled(1700000000456);
        note.title = "Ideas".to_string();
        note.body = "# heading".to_string();
        let json = serde_json::to_value(&note).expect("note should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1700000000456i64,
                "title": "Ideas",
                "body": "# heading",
                "updatedAt": 1700000000456i64
            })
        );
    }

    #[test]
    fn untitled_note_starts_empty() {
        let note = Note::untitled(7);
        assert_eq!(note.title, "Untitled");
        assert!(note.body.is_empty());
        assert_eq!(note.updated_at, note.id);
    }
}
