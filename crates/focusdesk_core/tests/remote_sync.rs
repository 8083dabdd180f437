use focusdesk_core::{
    MemoryKeyValueStore, MemoryRemote, RemoteDocument, RemoteError, RemoteStore, SyncPayload,
    Task, Workspace,
};
use std::sync::Arc;

fn attached_workspace() -> (Workspace<MemoryKeyValueStore>, MemoryRemote) {
    let workspace = Workspace::new(MemoryKeyValueStore::new());
    let remote = MemoryRemote::new();
    workspace
        .attach_remote(Arc::new(remote.clone()), "ada")
        .unwrap();
    (workspace, remote)
}

#[test]
fn local_mutations_push_the_full_snapshot() {
    let (workspace, remote) = attached_workspace();

    let task = workspace.tasks().add("write trip notes");
    workspace.tasks().toggle(task.id);
    workspace.notes().create();

    let document = remote.document("ada").expect("document should exist");
    let tasks = document.tasks.expect("tasks field should be pushed");
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].completed);
    assert_eq!(document.tasks_completed, Some(1));
    assert_eq!(document.notes.expect("notes field should be pushed").len(), 1);
    let timer = document.timer.expect("timer field should be pushed");
    assert_eq!(timer.seconds_remaining, 1500);
}

#[test]
fn remote_pull_replaces_local_tasks_regardless_of_prior_state() {
    let (workspace, remote) = attached_workspace();
    workspace.tasks().add("stale local task");

    remote.write_document(
        "ada",
        &RemoteDocument {
            tasks: Some(vec![
                Task::new(1, "from the laptop"),
                Task {
                    id: 2,
                    text: "already done".to_string(),
                    completed: true,
                },
            ]),
            tasks_completed: Some(1),
            ..RemoteDocument::default()
        },
    );

    let tasks = workspace.tasks().list();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].text, "from the laptop");
    assert_eq!(workspace.tasks().completed_count(), 1);
}

#[test]
fn remote_pull_refreshes_notes_and_active_pointer() {
    let (workspace, remote) = attached_workspace();

    remote.write_document(
        "ada",
        &RemoteDocument {
            notes: Some(vec![focusdesk_core::Note {
                id: 41,
                title: "Synced".to_string(),
                body: "from elsewhere".to_string(),
                updated_at: 41,
            }]),
            ..RemoteDocument::default()
        },
    );

    let notes = workspace.notes().list();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].title, "Synced");
    assert_eq!(workspace.notes().active().map(|note| note.id), Some(41));
}

#[test]
fn attach_applies_an_existing_document_immediately() {
    let remote = MemoryRemote::new();
    remote.write_document(
        "ada",
        &RemoteDocument {
            tasks: Some(vec![Task::new(9, "planned earlier")]),
            tasks_completed: Some(0),
            ..RemoteDocument::default()
        },
    );

    let workspace = Workspace::new(MemoryKeyValueStore::new());
    workspace
        .attach_remote(Arc::new(remote), "ada")
        .unwrap();

    assert_eq!(workspace.tasks().list().len(), 1);
    assert_eq!(workspace.attached_user().as_deref(), Some("ada"));
}

#[test]
fn detach_stops_pushes_and_pulls() {
    let (workspace, remote) = attached_workspace();
    workspace.tasks().add("pushed");
    workspace.detach_remote();

    workspace.tasks().add("not pushed");
    let document = remote.document("ada").expect("document should exist");
    assert_eq!(document.tasks.expect("tasks").len(), 1);

    remote.write_document(
        "ada",
        &RemoteDocument {
            tasks: Some(vec![]),
            tasks_completed: Some(0),
            ..RemoteDocument::default()
        },
    );
    assert_eq!(
        workspace.tasks().list().len(),
        2,
        "a detached workspace must ignore remote updates"
    );
    assert_eq!(workspace.attached_user(), None);
}

struct FailingRemote;

impl RemoteStore for FailingRemote {
    fn merge_write(&self, _user_id: &str, _payload: &SyncPayload) -> Result<(), RemoteError> {
        Err(RemoteError::new("backend_unavailable", "remote is down"))
    }

    fn subscribe(
        &self,
        _user_id: &str,
        _on_change: focusdesk_core::sync::remote::RemoteCallback,
    ) -> Result<focusdesk_core::RemoteSubscription, RemoteError> {
        Ok(focusdesk_core::RemoteSubscription::new(|| {}))
    }
}

#[test]
fn failing_remote_never_corrupts_local_state() {
    let workspace = Workspace::new(MemoryKeyValueStore::new());
    workspace
        .attach_remote(Arc::new(FailingRemote), "ada")
        .unwrap();

    let task = workspace.tasks().add("survives outages");
    workspace.tasks().toggle(task.id);
    workspace.notes().create();

    assert_eq!(workspace.tasks().list().len(), 1);
    assert_eq!(workspace.tasks().completed_count(), 1);
    assert_eq!(workspace.notes().list().len(), 1);
}
