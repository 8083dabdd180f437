//! Domain model for tasks, notes, timer state and sync payloads.
//!
//! # Responsibility
//! - Define the canonical data structures shared by managers, storage and sync.
//! - Keep wire shapes stable: serialized forms are the storage/remote contract.
//!
//! # Invariants
//! - Ids are creation-time epoch milliseconds, unique within their collection.
//! - Serialized field names never change without a storage migration.

pub mod ident;
pub mod note;
pub mod payload;
pub mod task;
pub mod timer;
