//! Bounded calculation history and its undo/redo snapshots.

/// Size-bounded FIFO history store.
pub mod history;
/// Snapshot stacks driving undo and redo.
pub mod memento;
