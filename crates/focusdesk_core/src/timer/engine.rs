//! Finite-state countdown engine.
//!
//! # Responsibility
//! - Own the timer snapshot: remaining seconds, mode, run state, counters.
//! - Run the one-second ticker thread between `start` and `pause`/completion.
//! - Emit tick and completion events; call the remote hook on work completion.
//!
//! # Invariants
//! - `start` while running is a no-op; two tick streams can never coexist.
//! - A session that reaches zero stops itself before completion is reported.
//! - `seconds_remaining` equals the full mode duration right after
//!   `set_mode` or `reset`.
//!
//! Ticks are scheduled by sleeping one second between decrements; there is
//! no drift correction, so long runs accumulate minor scheduler drift.

use crate::model::timer::{TimerMode, TimerSnapshot};
use log::{error, info};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

/// Fixed focus credit per completed work session, in minutes.
const FOCUS_MINUTES_PER_WORK_SESSION: u32 = 25;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Notification emitted to engine subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; carries the new remaining time and a full snapshot.
    Tick {
        seconds_remaining: u32,
        snapshot: TimerSnapshot,
    },
    /// A countdown reached zero.
    Completed(SessionCompleted),
}

/// Completion summary handed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCompleted {
    /// Mode that just finished.
    pub mode: TimerMode,
    /// Work sessions completed so far (already incremented for this one).
    pub completed_work_sessions: u32,
}

/// Counter summary handed to the remote hook after a work completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusReport {
    pub completed_work_sessions: u32,
    pub total_focus_minutes: u32,
    pub mode: TimerMode,
}

pub type TimerObserver = Arc<dyn Fn(&TimerEvent) + Send + Sync>;
pub type TimerRemoteHook = Arc<dyn Fn(&FocusReport) + Send + Sync>;

pub(crate) struct EngineState {
    snapshot: TimerSnapshot,
    /// Bumped whenever the live ticker must retire (pause, reset, restart).
    ticker_generation: u64,
    observers: Vec<TimerObserver>,
    remote_hook: Option<TimerRemoteHook>,
}

/// Shared-handle countdown engine. Clones control the same timer.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Arc<Mutex<EngineState>>,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    /// Creates an idle engine: work mode, full duration, zero counters.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(EngineState {
                snapshot: TimerSnapshot::default(),
                ticker_generation: 0,
                observers: Vec::new(),
                remote_hook: None,
            })),
        }
    }

    /// Adds a tick/completion subscriber. Subscribers stack; none are dropped.
    pub fn subscribe(&self, observer: impl Fn(&TimerEvent) + Send + Sync + 'static) {
        self.lock().observers.push(Arc::new(observer));
    }

    /// Registers the remote hook, replacing any prior registration.
    pub fn set_remote_hook(&self, hook: impl Fn(&FocusReport) + Send + Sync + 'static) {
        self.lock().remote_hook = Some(Arc::new(hook));
    }

    /// Removes the remote hook, if any.
    pub fn clear_remote_hook(&self) {
        self.lock().remote_hook = None;
    }

    /// Returns the current state snapshot.
    pub fn state(&self) -> TimerSnapshot {
        self.lock().snapshot
    }

    /// Begins ticking once per second. No-op while already running.
    ///
    /// Starting an idle engine whose countdown already sits at zero restores
    /// the full mode duration first, so a finished session can be re-run
    /// without an immediate spurious completion.
    pub fn start(&self) {
        let generation = {
            let mut state = self.lock();
            if state.snapshot.is_running {
                return;
            }
            if state.snapshot.seconds_remaining == 0 {
                state.snapshot.seconds_remaining = state.snapshot.mode.duration_secs();
            }
            state.snapshot.is_running = true;
            state.ticker_generation += 1;
            state.ticker_generation
        };

        let engine = self.clone();
        let spawned = thread::Builder::new()
            .name("focusdesk-ticker".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(TICK_INTERVAL);
                    if !engine.ticker_tick(generation) {
                        break;
                    }
                }
            });

        if let Err(err) = spawned {
            error!("event=ticker_spawn module=timer status=error error={err}");
            self.lock().snapshot.is_running = false;
        }
    }

    /// Stops ticking. Safe to call while already paused.
    pub fn pause(&self) {
        let mut state = self.lock();
        state.snapshot.is_running = false;
        state.ticker_generation += 1;
    }

    /// Stops ticking and restores the current mode's full duration.
    pub fn reset(&self) {
        let (event, observers) = {
            let mut state = self.lock();
            state.snapshot.is_running = false;
            state.ticker_generation += 1;
            state.snapshot.seconds_remaining = state.snapshot.mode.duration_secs();
            (tick_event(&state.snapshot), state.observers.clone())
        };
        dispatch(&observers, &event);
    }

    /// Switches mode and restores that mode's full duration. Never starts
    /// the ticker; a running session keeps ticking from the new duration.
    pub fn set_mode(&self, mode: TimerMode) {
        let (event, observers) = {
            let mut state = self.lock();
            state.snapshot.mode = mode;
            state.snapshot.seconds_remaining = mode.duration_secs();
            (tick_event(&state.snapshot), state.observers.clone())
        };
        dispatch(&observers, &event);
    }

    /// Advances the countdown by one second, exactly as one ticker beat
    /// does. No-op while paused. Exposed so embedders (and tests) can drive
    /// the engine from their own clock.
    pub fn tick(&self) {
        self.advance_one_second();
    }

    /// Ticker-thread beat. Returns whether this ticker should keep running.
    fn ticker_tick(&self, generation: u64) -> bool {
        {
            let state = self.lock();
            if state.ticker_generation != generation || !state.snapshot.is_running {
                return false;
            }
        }
        self.advance_one_second();
        let state = self.lock();
        state.ticker_generation == generation && state.snapshot.is_running
    }

    fn advance_one_second(&self) {
        let (tick, completion, hook_call, observers) = {
            let mut state = self.lock();
            if !state.snapshot.is_running {
                return;
            }

            state.snapshot.seconds_remaining = state.snapshot.seconds_remaining.saturating_sub(1);

            let mut completion = None;
            let mut hook_call = None;
            if state.snapshot.seconds_remaining == 0 {
                state.snapshot.is_running = false;
                state.ticker_generation += 1;

                if state.snapshot.mode == TimerMode::Work {
                    state.snapshot.completed_work_sessions += 1;
                    state.snapshot.total_focus_minutes += FOCUS_MINUTES_PER_WORK_SESSION;
                    if let Some(hook) = state.remote_hook.clone() {
                        hook_call = Some((
                            hook,
                            FocusReport {
                                completed_work_sessions: state.snapshot.completed_work_sessions,
                                total_focus_minutes: state.snapshot.total_focus_minutes,
                                mode: state.snapshot.mode,
                            },
                        ));
                    }
                }

                info!(
                    "event=session_complete module=timer status=ok mode={:?} completed_work_sessions={}",
                    state.snapshot.mode, state.snapshot.completed_work_sessions
                );
                completion = Some(SessionCompleted {
                    mode: state.snapshot.mode,
                    completed_work_sessions: state.snapshot.completed_work_sessions,
                });
            }

            (
                tick_event(&state.snapshot),
                completion,
                hook_call,
                state.observers.clone(),
            )
        };

        dispatch(&observers, &tick);
        if let Some((hook, report)) = hook_call {
            hook(&report);
        }
        if let Some(done) = completion {
            dispatch(&observers, &TimerEvent::Completed(done));
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.shared.lock().expect("timer engine mutex poisoned")
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<EngineState>> {
        Arc::downgrade(&self.shared)
    }

    pub(crate) fn upgrade(weak: &Weak<Mutex<EngineState>>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }
}

fn tick_event(snapshot: &TimerSnapshot) -> TimerEvent {
    TimerEvent::Tick {
        seconds_remaining: snapshot.seconds_remaining,
        snapshot: *snapshot,
    }
}

fn dispatch(observers: &[TimerObserver], event: &TimerEvent) {
    for observer in observers {
        observer(event);
    }
}
