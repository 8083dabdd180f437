//! Timer modes and the timer state snapshot.
//!
//! # Responsibility
//! - Define the three countdown phases and their fixed durations.
//! - Define the snapshot shape mirrored to storage by the sync bridge.
//!
//! # Invariants
//! - Durations are fixed: work 1500 s, short break 300 s, long break 900 s.
//! - `seconds_remaining` equals the full mode duration immediately after a
//!   mode change or reset.

use serde::{Deserialize, Serialize};

/// Countdown phase. Serialized as `work` / `shortBreak` / `longBreak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    /// Full countdown duration for this mode, in seconds.
    pub fn duration_secs(self) -> u32 {
        match self {
            Self::Work => 1500,
            Self::ShortBreak => 300,
            Self::LongBreak => 900,
        }
    }
}

/// Read-only view of the engine state.
///
/// This is also the wire shape written under the timer storage key by the
/// sync bridge. The timer itself never reads it back: state intentionally
/// resets on reload and the stored snapshot serves cross-device display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub seconds_remaining: u32,
    pub mode: TimerMode,
    pub is_running: bool,
    pub completed_work_sessions: u32,
    pub total_focus_minutes: u32,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            seconds_remaining: TimerMode::Work.duration_secs(),
            mode: TimerMode::Work,
            is_running: false,
            completed_work_sessions: 0,
            total_focus_minutes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TimerMode, TimerSnapshot};

    #[test]
    fn durations_are_fixed_per_mode() {
        assert_eq!(TimerMode::Work.duration_secs(), 1500);
        assert_eq!(TimerMode::ShortBreak.duration_secs(), 300);
        assert_eq!(TimerMode::LongBreak.duration_secs(), 900);
    }

    #[test]
    fn initial_snapshot_is_idle_work_session() {
        let snapshot = TimerSnapshot::default();
        assert_eq!(snapshot.mode, TimerMode::Work);
        assert_eq!(snapshot.seconds_remaining, 1500);
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.completed_work_sessions, 0);
        assert_eq!(snapshot.total_focus_minutes, 0);
    }

    #[test]
    fn serialized_shape_matches_sync_contract() {
        let json =
            serde_json::to_value(TimerSnapshot::default()).expect("snapshot should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "secondsRemaining": 1500,
                "mode": "work",
                "isRunning": false,
                "completedWorkSessions": 0,
                "totalFocusMinutes": 0
            })
        );
    }

    #[test]
    fn mode_names_round_trip() {
        for mode in [TimerMode::Work, TimerMode::ShortBreak, TimerMode::LongBreak] {
            let text = serde_json::to_string(&mode).expect("mode should serialize");
            let parsed: TimerMode = serde_json::from_str(&text).expect("mode should parse");
            assert_eq!(parsed, mode);
        }
        assert_eq!(
            serde_json::to_string(&TimerMode::LongBreak).expect("serialize"),
            "\"longBreak\""
        );
    }
}
