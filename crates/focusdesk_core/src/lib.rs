//! Core domain logic for FocusDesk: countdown timer, task checklist,
//! multi-note collection and optional remote sync, all persisted to a local
//! string-keyed store. The presentation layer lives elsewhere and consumes
//! the change notifications these components emit.

pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod sync;
pub mod timer;
pub mod workspace;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::ident::IdGenerator;
pub use model::note::{Note, NotePatch};
pub use model::payload::{RemoteDocument, SyncPayload};
pub use model::task::Task;
pub use model::timer::{TimerMode, TimerSnapshot};
pub use service::note_service::{
    derive_markdown_preview, MarkdownPreview, NotePreview, NoteService, NotesChanged,
};
pub use service::task_service::{TaskService, TasksChanged};
pub use store::{
    KeyValueStore, MemoryKeyValueStore, SharedStore, SqliteKeyValueStore, StoreError, StoreResult,
};
pub use sync::bridge::{AppliedFields, SyncBridge};
pub use sync::memory::MemoryRemote;
pub use sync::remote::{RemoteError, RemoteResult, RemoteStore, RemoteSubscription};
pub use timer::engine::{
    FocusReport, SessionCompleted, TimerEngine, TimerEvent, TimerObserver, TimerRemoteHook,
};
pub use timer::policy::{install_auto_advance, next_mode};
pub use workspace::Workspace;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
