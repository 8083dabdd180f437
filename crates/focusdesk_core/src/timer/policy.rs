//! Session auto-chaining policy.
//!
//! # Responsibility
//! - Decide which mode follows a completed session.
//! - Wire that decision onto an engine so the next period starts with no
//!   idle gap.
//!
//! # Invariants
//! - Every 4th completed work session is followed by a long break.
//! - Every break, long or short, is followed by work.
//!
//! The engine never chooses its own next mode; this module is the consumer
//! side of that contract.

use crate::model::timer::TimerMode;
use crate::timer::engine::{SessionCompleted, TimerEngine, TimerEvent};

/// Sessions between long breaks.
const WORK_SESSIONS_PER_LONG_BREAK: u32 = 4;

/// Returns the mode that should follow a completed session.
pub fn next_mode(done: &SessionCompleted) -> TimerMode {
    match done.mode {
        TimerMode::Work => {
            if done.completed_work_sessions % WORK_SESSIONS_PER_LONG_BREAK == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            }
        }
        TimerMode::ShortBreak | TimerMode::LongBreak => TimerMode::Work,
    }
}

/// Subscribes the chaining policy to an engine: on every completion the next
/// mode is selected and the timer restarts immediately.
///
/// Holds only a weak reference, so installing the policy does not keep the
/// engine alive.
pub fn install_auto_advance(engine: &TimerEngine) {
    let weak = engine.downgrade();
    engine.subscribe(move |event| {
        if let TimerEvent::Completed(done) = event {
            if let Some(engine) = TimerEngine::upgrade(&weak) {
                engine.set_mode(next_mode(done));
                engine.start();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::next_mode;
    use crate::model::timer::TimerMode;
    use crate::timer::engine::SessionCompleted;

    fn after_work(count: u32) -> TimerMode {
        next_mode(&SessionCompleted {
            mode: TimerMode::Work,
            completed_work_sessions: count,
        })
    }

    #[test]
    fn every_fourth_work_session_earns_a_long_break() {
        for count in 1..=12 {
            let expected = if count % 4 == 0 {
                TimerMode::LongBreak
            } else {
                TimerMode::ShortBreak
            };
            assert_eq!(after_work(count), expected, "after work session {count}");
        }
    }

    #[test]
    fn breaks_always_return_to_work() {
        for mode in [TimerMode::ShortBreak, TimerMode::LongBreak] {
            let next = next_mode(&SessionCompleted {
                mode,
                completed_work_sessions: 3,
            });
            assert_eq!(next, TimerMode::Work);
        }
    }
}
