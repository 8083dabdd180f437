//! Local-store / remote-document bridge.
//!
//! # Responsibility
//! - Push: merge-write the aggregated local snapshot into the remote
//!   document; log and swallow failures.
//! - Pull: on every remote update, overwrite the local storage entries for
//!   whichever fields the document carries, then hand control back to the
//!   caller so managers can reload.
//!
//! # Invariants
//! - An absent remote document means "no data yet": nothing is overwritten.
//! - Pull writes storage first, then reports which fields were applied;
//!   managers reload from storage, never from the document directly.

use crate::model::payload::{RemoteDocument, SyncPayload};
use crate::store::{
    KeyValueStore, NOTES_KEY, TASKS_COMPLETED_KEY, TASKS_KEY, TIMER_STATE_KEY,
};
use crate::sync::remote::{RemoteCallback, RemoteResult, RemoteStore, RemoteSubscription};
use log::{debug, info, warn};
use std::sync::Arc;

/// Which document fields a pull overwrote locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppliedFields {
    pub notes: bool,
    pub tasks: bool,
    pub timer: bool,
}

impl AppliedFields {
    pub fn any(&self) -> bool {
        self.notes || self.tasks || self.timer
    }
}

/// Bridge between one local store and one remote document store.
pub struct SyncBridge<S: KeyValueStore> {
    store: S,
    remote: Arc<dyn RemoteStore>,
}

impl<S: KeyValueStore + Clone + 'static> SyncBridge<S> {
    pub fn new(store: S, remote: Arc<dyn RemoteStore>) -> Self {
        Self { store, remote }
    }

    /// Merge-writes the full local snapshot into the user's remote document.
    ///
    /// Failures are logged and swallowed: the next local mutation pushes
    /// again, which is the only retry this system needs.
    pub fn push(&self, user_id: &str, payload: &SyncPayload) {
        match self.remote.merge_write(user_id, payload) {
            Ok(()) => debug!(
                "event=sync_push module=sync status=ok tasks={} notes={}",
                payload.tasks.len(),
                payload.notes.len()
            ),
            Err(err) => warn!("event=sync_push module=sync status=error error={err}"),
        }
    }

    /// Subscribes to the user's remote document. Every delivered update is
    /// written into local storage field by field; `on_applied` then runs
    /// with the set of fields that changed so managers can reload.
    pub fn attach(
        &self,
        user_id: &str,
        on_applied: Arc<dyn Fn(AppliedFields) + Send + Sync>,
    ) -> RemoteResult<RemoteSubscription> {
        let store = self.store.clone();
        let callback: RemoteCallback = Arc::new(move |document| {
            let Some(document) = document else {
                debug!("event=sync_pull module=sync status=empty");
                return;
            };
            let applied = apply_remote_document(&store, document);
            if applied.any() {
                on_applied(applied);
            }
        });

        let subscription = self.remote.subscribe(user_id, callback)?;
        info!("event=sync_attach module=sync status=ok");
        Ok(subscription)
    }
}

/// Overwrites local storage entries with the document's present fields.
fn apply_remote_document(store: &impl KeyValueStore, document: &RemoteDocument) -> AppliedFields {
    let mut applied = AppliedFields::default();

    if let Some(notes) = &document.notes {
        match serde_json::to_string(notes) {
            Ok(raw) => match store.set(NOTES_KEY, &raw) {
                Ok(()) => applied.notes = true,
                Err(err) => warn!("event=sync_pull module=sync status=error field=notes error={err}"),
            },
            Err(err) => warn!("event=sync_pull module=sync status=error field=notes error={err}"),
        }
    }

    if let Some(tasks) = &document.tasks {
        match serde_json::to_string(tasks) {
            Ok(raw) => match store.set(TASKS_KEY, &raw) {
                Ok(()) => {
                    let completed = document.tasks_completed.unwrap_or(0);
                    match store.set(TASKS_COMPLETED_KEY, &completed.to_string()) {
                        Ok(()) => applied.tasks = true,
                        Err(err) => warn!(
                            "event=sync_pull module=sync status=error field=tasks error={err}"
                        ),
                    }
                }
                Err(err) => warn!("event=sync_pull module=sync status=error field=tasks error={err}"),
            },
            Err(err) => warn!("event=sync_pull module=sync status=error field=tasks error={err}"),
        }
    }

    if let Some(timer) = &document.timer {
        match serde_json::to_string(timer) {
            Ok(raw) => match store.set(TIMER_STATE_KEY, &raw) {
                Ok(()) => applied.timer = true,
                Err(err) => warn!("event=sync_pull module=sync status=error field=timer error={err}"),
            },
            Err(err) => warn!("event=sync_pull module=sync status=error field=timer error={err}"),
        }
    }

    if applied.any() {
        info!(
            "event=sync_pull module=sync status=ok notes={} tasks={} timer={}",
            applied.notes, applied.tasks, applied.timer
        );
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::{AppliedFields, SyncBridge};
    use crate::model::payload::RemoteDocument;
    use crate::model::task::Task;
    use crate::model::timer::TimerSnapshot;
    use crate::store::{KeyValueStore, MemoryKeyValueStore, TASKS_COMPLETED_KEY, TASKS_KEY};
    use crate::sync::memory::MemoryRemote;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn pull_writes_present_fields_and_reports_them() {
        let store = MemoryKeyValueStore::new();
        let remote = MemoryRemote::new();
        remote.write_document(
            "ada",
            &RemoteDocument {
                tasks: Some(vec![Task::new(1, "from the other device")]),
                tasks_completed: Some(1),
                ..RemoteDocument::default()
            },
        );

        let bridge = SyncBridge::new(store.clone(), Arc::new(remote));
        let applications = Arc::new(AtomicU32::new(0));
        let seen = applications.clone();
        let _subscription = bridge
            .attach(
                "ada",
                Arc::new(move |applied: AppliedFields| {
                    assert!(applied.tasks);
                    assert!(!applied.notes);
                    assert!(!applied.timer);
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert_eq!(applications.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.get(TASKS_COMPLETED_KEY).unwrap().as_deref(),
            Some("1")
        );
        let raw = store.get(TASKS_KEY).unwrap().expect("tasks should be stored");
        let tasks: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(tasks[0].text, "from the other device");
    }

    #[test]
    fn absent_document_applies_nothing() {
        let store = MemoryKeyValueStore::new();
        let bridge = SyncBridge::new(store.clone(), Arc::new(MemoryRemote::new()));
        let applications = Arc::new(AtomicU32::new(0));
        let seen = applications.clone();
        let _subscription = bridge
            .attach(
                "nobody",
                Arc::new(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert_eq!(applications.load(Ordering::SeqCst), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn timer_snapshot_lands_under_its_own_key() {
        let store = MemoryKeyValueStore::new();
        let remote = MemoryRemote::new();
        remote.write_document(
            "ada",
            &RemoteDocument {
                timer: Some(TimerSnapshot::default()),
                ..RemoteDocument::default()
            },
        );
        let bridge = SyncBridge::new(store.clone(), Arc::new(remote));
        let _subscription = bridge.attach("ada", Arc::new(|_| {})).unwrap();

        let raw = store
            .get(crate::store::TIMER_STATE_KEY)
            .unwrap()
            .expect("timer snapshot should be stored");
        let snapshot: TimerSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(snapshot, TimerSnapshot::default());
    }
}
