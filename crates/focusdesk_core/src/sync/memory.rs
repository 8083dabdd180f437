//! In-process remote document store.
//!
//! Stands in for a hosted backend: same merge-write and subscription
//! semantics, delivered synchronously on the writer's thread. Backs the
//! sync tests and lets two workspaces in one process mirror each other.

use crate::model::payload::{RemoteDocument, SyncPayload};
use crate::sync::remote::{RemoteCallback, RemoteResult, RemoteStore, RemoteSubscription};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RemoteState {
    documents: HashMap<String, RemoteDocument>,
    subscribers: HashMap<String, Vec<(u64, RemoteCallback)>>,
    next_token: u64,
}

/// Map-backed remote store; clones share the same documents and subscribers.
#[derive(Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the user's document, if one exists.
    pub fn document(&self, user_id: &str) -> Option<RemoteDocument> {
        self.lock().documents.get(user_id).cloned()
    }

    /// Merges a partial document into the user's document and notifies
    /// subscribers, as another device's push would.
    pub fn write_document(&self, user_id: &str, document: &RemoteDocument) {
        let (current, subscribers) = {
            let mut state = self.lock();
            let entry = state.documents.entry(user_id.to_string()).or_default();
            entry.merge_document(document);
            let current = entry.clone();
            (current, subscribers_of(&state, user_id))
        };
        deliver(&subscribers, Some(&current));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().expect("remote state mutex poisoned")
    }
}

impl RemoteStore for MemoryRemote {
    fn merge_write(&self, user_id: &str, payload: &SyncPayload) -> RemoteResult<()> {
        let (current, subscribers) = {
            let mut state = self.lock();
            let entry = state.documents.entry(user_id.to_string()).or_default();
            entry.merge_payload(payload);
            let current = entry.clone();
            (current, subscribers_of(&state, user_id))
        };
        deliver(&subscribers, Some(&current));
        Ok(())
    }

    fn subscribe(
        &self,
        user_id: &str,
        on_change: RemoteCallback,
    ) -> RemoteResult<RemoteSubscription> {
        let (token, current) = {
            let mut state = self.lock();
            let token = state.next_token;
            state.next_token += 1;
            state
                .subscribers
                .entry(user_id.to_string())
                .or_default()
                .push((token, on_change.clone()));
            (token, state.documents.get(user_id).cloned())
        };

        on_change(current.as_ref());

        let shared = self.state.clone();
        let user = user_id.to_string();
        Ok(RemoteSubscription::new(move || {
            let mut state = shared.lock().expect("remote state mutex poisoned");
            if let Some(list) = state.subscribers.get_mut(&user) {
                list.retain(|(registered, _)| *registered != token);
            }
        }))
    }
}

fn subscribers_of(state: &RemoteState, user_id: &str) -> Vec<RemoteCallback> {
    state
        .subscribers
        .get(user_id)
        .map(|list| list.iter().map(|(_, callback)| callback.clone()).collect())
        .unwrap_or_default()
}

fn deliver(subscribers: &[RemoteCallback], document: Option<&RemoteDocument>) {
    for callback in subscribers {
        callback(document);
    }
}
