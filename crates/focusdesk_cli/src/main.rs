//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `focusdesk_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use focusdesk_core::{MemoryKeyValueStore, Workspace};

fn main() {
    println!("focusdesk_core version={}", focusdesk_core::core_version());

    let workspace = Workspace::new(MemoryKeyValueStore::new());
    let task = workspace.tasks().add("try focusdesk");
    workspace.tasks().toggle(task.id);
    let note = workspace.notes().create();

    let timer = workspace.timer().state();
    println!(
        "timer mode={:?} seconds_remaining={} running={}",
        timer.mode, timer.seconds_remaining, timer.is_running
    );
    println!(
        "tasks total={} completed={}",
        workspace.tasks().list().len(),
        workspace.tasks().completed_count()
    );
    println!(
        "notes total={} active={}",
        workspace.notes().list().len(),
        workspace.notes().active().map(|active| active.id) == Some(note.id)
    );
}
