//! Task checklist manager.
//!
//! # Responsibility
//! - CRUD over the task collection plus the completed-task counter.
//! - Persist after every mutation; reload on demand (and on remote pulls).
//!
//! # Invariants
//! - `completed_count` always equals the number of tasks with
//!   `completed == true` after any local mutation.
//! - Unknown-id mutations are silent no-ops: no persist, no notification.
//! - Missing or malformed stored data loads as an empty collection and a
//!   zero counter, never as an error.

use crate::model::ident::IdGenerator;
use crate::model::task::Task;
use crate::store::{KeyValueStore, TASKS_COMPLETED_KEY, TASKS_KEY};
use log::warn;
use std::sync::{Arc, Mutex, MutexGuard};

/// Change notification carrying the post-mutation collection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasksChanged {
    pub tasks: Vec<Task>,
    pub completed: u32,
}

pub type TaskObserver = Arc<dyn Fn(&TasksChanged) + Send + Sync>;
pub type TaskRemoteHook = Arc<dyn Fn(&TasksChanged) + Send + Sync>;

struct TaskState {
    tasks: Vec<Task>,
    completed: u32,
    observers: Vec<TaskObserver>,
    remote_hook: Option<TaskRemoteHook>,
}

/// Task list manager over one store handle.
pub struct TaskService<S: KeyValueStore> {
    store: S,
    ids: IdGenerator,
    inner: Mutex<TaskState>,
}

impl<S: KeyValueStore> TaskService<S> {
    /// Creates an empty manager. Call [`TaskService::load`] to pull persisted
    /// state in.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: IdGenerator::new(),
            inner: Mutex::new(TaskState {
                tasks: Vec::new(),
                completed: 0,
                observers: Vec::new(),
                remote_hook: None,
            }),
        }
    }

    /// Replaces in-memory state with whatever storage holds and notifies
    /// subscribers. Missing or malformed entries load as empty/zero.
    pub fn load(&self) {
        let (change, observers) = {
            let mut state = self.lock();
            state.tasks = match self.store.get(TASKS_KEY) {
                Ok(Some(raw)) => match serde_json::from_str::<Vec<Task>>(&raw) {
                    Ok(tasks) => tasks,
                    Err(err) => {
                        warn!("event=task_load module=tasks status=malformed error={err}");
                        Vec::new()
                    }
                },
                Ok(None) => Vec::new(),
                Err(err) => {
                    warn!("event=task_load module=tasks status=error error={err}");
                    Vec::new()
                }
            };
            state.completed = match self.store.get(TASKS_COMPLETED_KEY) {
                Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
                _ => 0,
            };
            (change_of(&state), state.observers.clone())
        };
        notify(&observers, &change);
    }

    /// Appends a new unchecked task and persists.
    pub fn add(&self, text: impl Into<String>) -> Task {
        let task = Task::new(self.ids.next_id(), text);
        let (change, hook, observers) = {
            let mut state = self.lock();
            state.tasks.push(task.clone());
            self.persist(&state);
            (change_of(&state), state.remote_hook.clone(), state.observers.clone())
        };
        fire_remote(hook, &change);
        notify(&observers, &change);
        task
    }

    /// Flips the completed flag of the matching task. Returns whether a task
    /// was found; unknown ids change nothing.
    pub fn toggle(&self, id: i64) -> bool {
        let result = {
            let mut state = self.lock();
            let found = match state.tasks.iter_mut().find(|task| task.id == id) {
                Some(task) => {
                    task.completed = !task.completed;
                    true
                }
                None => false,
            };
            if found {
                let completed = completed_in(&state.tasks);
                state.completed = completed;
                self.persist(&state);
                Some((change_of(&state), state.remote_hook.clone(), state.observers.clone()))
            } else {
                None
            }
        };
        let Some((change, hook, observers)) = result else {
            return false;
        };
        fire_remote(hook, &change);
        notify(&observers, &change);
        true
    }

    /// Removes the matching task. Returns whether a task was found.
    pub fn delete(&self, id: i64) -> bool {
        let result = {
            let mut state = self.lock();
            let before = state.tasks.len();
            state.tasks.retain(|task| task.id != id);
            if state.tasks.len() == before {
                None
            } else {
                let completed = completed_in(&state.tasks);
                state.completed = completed;
                self.persist(&state);
                Some((change_of(&state), state.remote_hook.clone(), state.observers.clone()))
            }
        };
        let Some((change, hook, observers)) = result else {
            return false;
        };
        fire_remote(hook, &change);
        notify(&observers, &change);
        true
    }

    /// Returns a snapshot copy of the collection, in insertion order.
    pub fn list(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    /// Returns the cached completed-task counter.
    pub fn completed_count(&self) -> u32 {
        self.lock().completed
    }

    /// Adds a change subscriber. Subscribers stack; none are dropped.
    pub fn subscribe(&self, observer: impl Fn(&TasksChanged) + Send + Sync + 'static) {
        self.lock().observers.push(Arc::new(observer));
    }

    /// Registers the remote-apply hook, replacing any prior registration.
    /// The hook fires after every persist with the tasks and counter.
    pub fn set_remote_hook(&self, hook: impl Fn(&TasksChanged) + Send + Sync + 'static) {
        self.lock().remote_hook = Some(Arc::new(hook));
    }

    /// Removes the remote-apply hook, if any.
    pub fn clear_remote_hook(&self) {
        self.lock().remote_hook = None;
    }

    fn persist(&self, state: &TaskState) {
        match serde_json::to_string(&state.tasks) {
            Ok(raw) => {
                if let Err(err) = self.store.set(TASKS_KEY, &raw) {
                    warn!("event=task_save module=tasks status=error error={err}");
                }
            }
            Err(err) => warn!("event=task_save module=tasks status=error error={err}"),
        }
        if let Err(err) = self
            .store
            .set(TASKS_COMPLETED_KEY, &state.completed.to_string())
        {
            warn!("event=task_save module=tasks status=error error={err}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, TaskState> {
        self.inner.lock().expect("task service mutex poisoned")
    }
}

fn completed_in(tasks: &[Task]) -> u32 {
    tasks.iter().filter(|task| task.completed).count() as u32
}

fn change_of(state: &TaskState) -> TasksChanged {
    TasksChanged {
        tasks: state.tasks.clone(),
        completed: state.completed,
    }
}

fn fire_remote(hook: Option<TaskRemoteHook>, change: &TasksChanged) {
    if let Some(hook) = hook {
        hook(change);
    }
}

fn notify(observers: &[TaskObserver], change: &TasksChanged) {
    for observer in observers {
        observer(change);
    }
}
