use thiserror::Error;

use crate::calculation::Calculation;

use super::history::HistoryStore;

/// Empty-stack failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,
    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,
}

/// Deep copy of the history contents at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Memento {
    records: Vec<Calculation>,
}

impl Memento {
    /// Captures the current contents of `store`.
    pub fn capture(store: &HistoryStore) -> Self {
        Self {
            records: store.as_sequence(),
        }
    }

    /// Records captured in this snapshot.
    pub fn records(&self) -> &[Calculation] {
        &self.records
    }

    fn restore_into(self, store: &mut HistoryStore) {
        store.replace(self.records);
    }
}

/// Undo and redo stacks of [`Memento`]s.
#[derive(Debug, Default, Clone)]
pub struct MementoStack {
    undo: Vec<Memento>,
    redo: Vec<Memento>,
}

impl MementoStack {
    /// Empty undo and redo stacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots `store` onto the undo stack and drops all redo states.
    pub fn record(&mut self, store: &HistoryStore) {
        self.undo.push(Memento::capture(store));
        self.redo.clear();
    }

    /// Restores the most recent snapshot, saving the current state for redo.
    pub fn undo(&mut self, store: &mut HistoryStore) -> Result<(), HistoryError> {
        let memento = self.undo.pop().ok_or(HistoryError::NothingToUndo)?;
        self.redo.push(Memento::capture(store));
        memento.restore_into(store);
        Ok(())
    }

    /// Reapplies the most recently undone state, saving the current one for undo.
    pub fn redo(&mut self, store: &mut HistoryStore) -> Result<(), HistoryError> {
        let memento = self.redo.pop().ok_or(HistoryError::NothingToRedo)?;
        self.undo.push(Memento::capture(store));
        memento.restore_into(store);
        Ok(())
    }

    /// Forgets every snapshot.
    pub fn reset(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Snapshots available to undo.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Snapshots available to redo.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
}
