//! Countdown timer engine and its session-chaining policy.
//!
//! # Responsibility
//! - Drive work/break countdowns with a once-per-second ticker.
//! - Report ticks and completions to subscribers; never pick the next mode
//!   itself (that policy belongs to the consumer, see [`policy`]).
//!
//! # Invariants
//! - At most one ticker is live per engine; stale tickers retire themselves.
//! - All notifications are dispatched with no engine lock held, so
//!   subscribers may call back into the engine.

pub mod engine;
pub mod policy;
