//! Application composition root.
//!
//! # Responsibility
//! - Own one store instance and construct the managers and timer around it.
//! - Install the session auto-advance policy.
//! - Wire remote hooks and the pull subscription when a user attaches.
//!
//! # Invariants
//! - No hidden statics: every workspace owns its own state.
//! - Timer, tasks and notes stay fully functional with no remote attached
//!   or with a permanently failing remote.
//! - Detaching drops the subscription and all remote hooks; nothing pushes
//!   after sign-out.

use crate::model::payload::SyncPayload;
use crate::service::note_service::NoteService;
use crate::service::task_service::TaskService;
use crate::store::{KeyValueStore, SqliteKeyValueStore, StoreResult};
use crate::sync::bridge::{AppliedFields, SyncBridge};
use crate::sync::remote::{RemoteResult, RemoteStore, RemoteSubscription};
use crate::timer::engine::TimerEngine;
use crate::timer::policy::install_auto_advance;
use log::info;
use std::path::Path;
use std::sync::{Arc, Mutex};

struct RemoteLink {
    user_id: String,
    /// Held for its Drop: releasing it stops remote deliveries.
    _subscription: RemoteSubscription,
}

/// One application instance: store, managers, timer, optional remote link.
pub struct Workspace<S: KeyValueStore + Clone + 'static> {
    store: S,
    tasks: Arc<TaskService<S>>,
    notes: Arc<NoteService<S>>,
    timer: TimerEngine,
    remote: Mutex<Option<RemoteLink>>,
}

impl<S: KeyValueStore + Clone + 'static> Workspace<S> {
    /// Builds a workspace over the given store, loads persisted state and
    /// installs the auto-advance policy.
    pub fn new(store: S) -> Self {
        let tasks = Arc::new(TaskService::new(store.clone()));
        let notes = Arc::new(NoteService::new(store.clone()));
        tasks.load();
        notes.load();

        let timer = TimerEngine::new();
        install_auto_advance(&timer);

        Self {
            store,
            tasks,
            notes,
            timer,
            remote: Mutex::new(None),
        }
    }

    pub fn tasks(&self) -> &TaskService<S> {
        &self.tasks
    }

    pub fn notes(&self) -> &NoteService<S> {
        &self.notes
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Assembles the full sync payload from current manager state.
    pub fn snapshot(&self) -> SyncPayload {
        SyncPayload {
            notes: self.notes.list(),
            tasks: self.tasks.list(),
            tasks_completed: self.tasks.completed_count(),
            timer: self.timer.state(),
        }
    }

    /// Attaches the workspace to a remote document store for `user_id`:
    /// subscribes to the user's document and registers remote hooks so every
    /// local persist pushes the full snapshot. Replaces any prior attachment.
    pub fn attach_remote(
        &self,
        remote: Arc<dyn RemoteStore>,
        user_id: &str,
    ) -> RemoteResult<()> {
        self.detach_remote();

        let bridge = Arc::new(SyncBridge::new(self.store.clone(), remote));

        // Hooks end up stored inside the services they read from, so they
        // hold weak handles: a workspace must stay collectable after drop.
        let push: Arc<dyn Fn() + Send + Sync> = {
            let tasks = Arc::downgrade(&self.tasks);
            let notes = Arc::downgrade(&self.notes);
            let timer = self.timer.downgrade();
            let bridge = bridge.clone();
            let user_id = user_id.to_string();
            Arc::new(move || {
                let (Some(tasks), Some(notes), Some(timer)) =
                    (tasks.upgrade(), notes.upgrade(), TimerEngine::upgrade(&timer))
                else {
                    return;
                };
                let payload = SyncPayload {
                    notes: notes.list(),
                    tasks: tasks.list(),
                    tasks_completed: tasks.completed_count(),
                    timer: timer.state(),
                };
                bridge.push(&user_id, &payload);
            })
        };

        let on_applied: Arc<dyn Fn(AppliedFields) + Send + Sync> = {
            let tasks = Arc::downgrade(&self.tasks);
            let notes = Arc::downgrade(&self.notes);
            Arc::new(move |applied| {
                if applied.tasks {
                    if let Some(tasks) = tasks.upgrade() {
                        tasks.load();
                    }
                }
                if applied.notes {
                    if let Some(notes) = notes.upgrade() {
                        notes.load();
                    }
                }
            })
        };

        let subscription = bridge.attach(user_id, on_applied)?;

        {
            let push = push.clone();
            self.tasks.set_remote_hook(move |_| push());
        }
        {
            let push = push.clone();
            self.notes.set_remote_hook(move |_| push());
        }
        self.timer.set_remote_hook(move |_| push());
        info!("event=remote_attach module=workspace status=ok");

        *self.remote_link() = Some(RemoteLink {
            user_id: user_id.to_string(),
            _subscription: subscription,
        });
        Ok(())
    }

    /// Drops the remote subscription and all remote hooks (sign-out). No-op
    /// when nothing is attached.
    pub fn detach_remote(&self) {
        let link = self.remote_link().take();
        if link.is_some() {
            self.tasks.clear_remote_hook();
            self.notes.clear_remote_hook();
            self.timer.clear_remote_hook();
            info!("event=remote_detach module=workspace status=ok");
        }
    }

    /// The user id of the current remote attachment, if any.
    pub fn attached_user(&self) -> Option<String> {
        self.remote_link().as_ref().map(|link| link.user_id.clone())
    }

    fn remote_link(&self) -> std::sync::MutexGuard<'_, Option<RemoteLink>> {
        self.remote.lock().expect("workspace remote mutex poisoned")
    }
}

impl Workspace<Arc<SqliteKeyValueStore>> {
    /// Opens (or creates) a durable workspace backed by a SQLite store file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(Arc::new(SqliteKeyValueStore::open(path)?)))
    }

    /// Opens a throwaway workspace backed by an in-memory SQLite store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(Arc::new(SqliteKeyValueStore::open_in_memory()?)))
    }
}
