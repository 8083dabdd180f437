//! Note collection manager.
//!
//! # Responsibility
//! - CRUD over the multi-note collection, newest-created first.
//! - Track the active-note pointer and re-resolve it on every read.
//! - Derive markdown preview projections for list rendering.
//!
//! # Invariants
//! - The active pointer is a weak id reference: if the id is gone, no note
//!   is active.
//! - `update` patches only the provided fields and refreshes `updated_at`.
//! - Missing or malformed stored data loads as an empty collection.

use crate::model::ident::{now_epoch_ms, IdGenerator};
use crate::model::note::{Note, NotePatch};
use crate::store::{KeyValueStore, NOTES_KEY};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Arc, Mutex, MutexGuard};

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const PREVIEW_TEXT_MAX_CHARS: usize = 100;

/// Change notification carrying the collection and the resolved active note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesChanged {
    pub notes: Vec<Note>,
    pub active: Option<Note>,
}

/// Markdown-derived projection for sidebar/list rendering. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePreview {
    pub id: i64,
    pub title: String,
    /// Sanitized summary text, markdown symbols stripped.
    pub preview_text: Option<String>,
    /// First markdown image path in the body.
    pub preview_image: Option<String>,
    pub updated_at: i64,
}

pub type NoteObserver = Arc<dyn Fn(&NotesChanged) + Send + Sync>;
pub type NoteRemoteHook = Arc<dyn Fn(&[Note]) + Send + Sync>;

struct NoteState {
    notes: Vec<Note>,
    active_id: Option<i64>,
    observers: Vec<NoteObserver>,
    remote_hook: Option<NoteRemoteHook>,
}

impl NoteState {
    fn resolve_active(&self) -> Option<Note> {
        let id = self.active_id?;
        self.notes.iter().find(|note| note.id == id).cloned()
    }

    fn change(&self) -> NotesChanged {
        NotesChanged {
            notes: self.notes.clone(),
            active: self.resolve_active(),
        }
    }
}

/// Note collection manager over one store handle.
pub struct NoteService<S: KeyValueStore> {
    store: S,
    ids: IdGenerator,
    inner: Mutex<NoteState>,
}

impl<S: KeyValueStore> NoteService<S> {
    /// Creates an empty manager. Call [`NoteService::load`] to pull persisted
    /// state in.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: IdGenerator::new(),
            inner: Mutex::new(NoteState {
                notes: Vec::new(),
                active_id: None,
                observers: Vec::new(),
                remote_hook: None,
            }),
        }
    }

    /// Replaces in-memory state with whatever storage holds and notifies
    /// subscribers. If no note is active yet and notes exist, the first
    /// (newest) note becomes active.
    pub fn load(&self) {
        let (change, observers) = {
            let mut state = self.lock();
            state.notes = match self.store.get(NOTES_KEY) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<Note>>(&raw) {
                    Ok(notes) => notes,
                    Err(err) => {
                        warn!("event=note_load module=notes status=malformed error={err}");
                        Vec::new()
                    }
                },
                Ok(None) => Vec::new(),
                Err(err) => {
                    warn!("event=note_load module=notes status=error error={err}");
                    Vec::new()
                }
            };
            if state.active_id.is_none() {
                let fallback = state.notes.first().map(|note| note.id);
                state.active_id = fallback;
            }
            (state.change(), state.observers.clone())
        };
        notify(&observers, &change);
    }

    /// Creates a new "Untitled" note, prepends it and makes it active.
    pub fn create(&self) -> Note {
        let note = Note::untitled(self.ids.next_id());
        let (change, hook, observers) = {
            let mut state = self.lock();
            state.notes.insert(0, note.clone());
            state.active_id = Some(note.id);
            self.persist(&state);
            (state.change(), state.remote_hook.clone(), state.observers.clone())
        };
        fire_remote(hook, &change.notes);
        notify(&observers, &change);
        note
    }

    /// Patches the matching note and refreshes its `updated_at`. Returns the
    /// updated note, or `None` when the id is unknown (nothing persists).
    pub fn update(&self, id: i64, patch: NotePatch) -> Option<Note> {
        let (updated, change, hook, observers) = {
            let mut state = self.lock();
            let note = state.notes.iter_mut().find(|note| note.id == id)?;
            if let Some(title) = patch.title {
                note.title = title;
            }
            if let Some(body) = patch.body {
                note.body = body;
            }
            note.updated_at = now_epoch_ms();
            let updated = note.clone();
            self.persist(&state);
            (updated, state.change(), state.remote_hook.clone(), state.observers.clone())
        };
        fire_remote(hook, &change.notes);
        notify(&observers, &change);
        Some(updated)
    }

    /// Removes the matching note. When it was active, the first remaining
    /// note (or none) becomes active. Returns whether a note was found.
    pub fn delete(&self, id: i64) -> bool {
        let result = {
            let mut state = self.lock();
            let before = state.notes.len();
            state.notes.retain(|note| note.id != id);
            if state.notes.len() == before {
                None
            } else {
                if state.active_id == Some(id) {
                    let fallback = state.notes.first().map(|note| note.id);
                    state.active_id = fallback;
                }
                self.persist(&state);
                Some((state.change(), state.remote_hook.clone(), state.observers.clone()))
            }
        };
        let Some((change, hook, observers)) = result else {
            return false;
        };
        fire_remote(hook, &change.notes);
        notify(&observers, &change);
        true
    }

    /// Returns a snapshot copy of the collection, newest-created first.
    pub fn list(&self) -> Vec<Note> {
        self.lock().notes.clone()
    }

    /// Returns markdown previews for the whole collection, derived on demand.
    pub fn previews(&self) -> Vec<NotePreview> {
        self.lock()
            .notes
            .iter()
            .map(|note| {
                let preview = derive_markdown_preview(&note.body);
                NotePreview {
                    id: note.id,
                    title: note.title.clone(),
                    preview_text: preview.preview_text,
                    preview_image: preview.preview_image,
                    updated_at: note.updated_at,
                }
            })
            .collect()
    }

    /// Resolves the active pointer against the current collection.
    pub fn active(&self) -> Option<Note> {
        self.lock().resolve_active()
    }

    /// Moves the active pointer and notifies. Session-local: nothing
    /// persists, and an id that no longer resolves simply reads as "no
    /// active note".
    pub fn set_active(&self, id: i64) {
        let (change, observers) = {
            let mut state = self.lock();
            state.active_id = Some(id);
            (state.change(), state.observers.clone())
        };
        notify(&observers, &change);
    }

    /// Adds a change subscriber. Subscribers stack; none are dropped.
    pub fn subscribe(&self, observer: impl Fn(&NotesChanged) + Send + Sync + 'static) {
        self.lock().observers.push(Arc::new(observer));
    }

    /// Registers the remote-apply hook, replacing any prior registration.
    /// The hook fires after every persist with the notes collection.
    pub fn set_remote_hook(&self, hook: impl Fn(&[Note]) + Send + Sync + 'static) {
        self.lock().remote_hook = Some(Arc::new(hook));
    }

    /// Removes the remote-apply hook, if any.
    pub fn clear_remote_hook(&self) {
        self.lock().remote_hook = None;
    }

    fn persist(&self, state: &NoteState) {
        match serde_json::to_string(&state.notes) {
            Ok(raw) => {
                if let Err(err) = self.store.set(NOTES_KEY, &raw) {
                    warn!("event=note_save module=notes status=error error={err}");
                }
            }
            Err(err) => warn!("event=note_save module=notes status=error error={err}"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NoteState> {
        self.inner.lock().expect("note service mutex poisoned")
    }
}

fn fire_remote(hook: Option<NoteRemoteHook>, notes: &[Note]) {
    if let Some(hook) = hook {
        hook(notes);
    }
}

fn notify(observers: &[NoteObserver], change: &NotesChanged) {
    for observer in observers {
        observer(change);
    }
}

/// Markdown-derived preview fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPreview {
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

/// Derives preview fields from markdown source.
///
/// Rules:
/// - `preview_image`: first markdown image path.
/// - `preview_text`: markdown symbols removed, whitespace normalized, first
///   100 chars retained.
pub fn derive_markdown_preview(body: &str) -> MarkdownPreview {
    let preview_image = MARKDOWN_IMAGE_RE
        .captures(body)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(body, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    let preview_text = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_TEXT_MAX_CHARS).collect())
    };

    MarkdownPreview {
        preview_text,
        preview_image,
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_markdown_preview, NoteService};
    use crate::model::note::NotePatch;
    use crate::store::MemoryKeyValueStore;

    #[test]
    fn update_patches_only_provided_fields() {
        let service = NoteService::new(MemoryKeyValueStore::new());
        let note = service.create();

        let updated = service
            .update(note.id, NotePatch::title("Plans"))
            .expect("note should exist");
        assert_eq!(updated.title, "Plans");
        assert_eq!(updated.body, "");

        let updated = service
            .update(note.id, NotePatch::body("- [ ] pack"))
            .expect("note should exist");
        assert_eq!(updated.title, "Plans");
        assert_eq!(updated.body, "- [ ] pack");
        assert!(updated.updated_at >= note.updated_at);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let service = NoteService::new(MemoryKeyValueStore::new());
        assert_eq!(service.update(404, NotePatch::title("x")), None);
    }

    #[test]
    fn set_active_to_missing_id_resolves_to_none() {
        let service = NoteService::new(MemoryKeyValueStore::new());
        service.create();
        service.set_active(404);
        assert_eq!(service.active(), None);
    }

    #[test]
    fn preview_extracts_first_image_path() {
        let preview = derive_markdown_preview("x ![a](one.png) y ![b](two.png)");
        assert_eq!(preview.preview_image.as_deref(), Some("one.png"));
    }

    #[test]
    fn preview_strips_markdown_symbols_and_limits_length() {
        let source = "# plans\n\n- [link](https://example.com)\n**bold** `code`";
        let preview = derive_markdown_preview(source);
        let text = preview.preview_text.expect("preview_text should exist");
        assert!(!text.contains('#'));
        assert!(!text.contains('*'));
        assert!(text.chars().count() <= 100);
    }

    #[test]
    fn empty_body_has_no_preview_text() {
        let preview = derive_markdown_preview("");
        assert_eq!(preview.preview_text, None);
        assert_eq!(preview.preview_image, None);
    }
}
