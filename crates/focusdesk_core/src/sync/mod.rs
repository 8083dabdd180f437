//! Remote mirroring of local state.
//!
//! # Responsibility
//! - Define the abstract remote document store contract ([`remote`]).
//! - Bridge local storage and managers to a remote document ([`bridge`]).
//! - Provide an in-process remote implementation for tests and offline
//!   embedders ([`memory`]).
//!
//! # Invariants
//! - Remote failures never corrupt local state; they are logged and the next
//!   local mutation retries implicitly.
//! - Consistency is last-write-wins per document field; no conflict
//!   detection.

pub mod bridge;
pub mod memory;
pub mod remote;
