//! Calculator facade tying operations, history, snapshots and listeners together.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    calculation::Calculation,
    config::{CalculatorConfig, ConfigError},
    core::{
        history::HistoryStore,
        memento::{HistoryError, MementoStack},
    },
    observer::{AutoSaveObserver, HistoryObserver, LoggingObserver, ObserverBus},
    ops::{parse_operand, OperationError, OperationRegistry},
    persist::{csv_file::CsvHistoryFile, HistorySink, PersistError},
    types::Number,
};

/// Any failure surfaced by a calculator command.
#[derive(Debug, Error)]
pub enum CalcError {
    /// Unknown operation, bad operand or arithmetic failure.
    #[error(transparent)]
    Operation(#[from] OperationError),
    /// Undo or redo with an empty stack.
    #[error(transparent)]
    History(#[from] HistoryError),
    /// History file could not be saved or loaded.
    #[error(transparent)]
    Persist(#[from] PersistError),
    /// Rejected configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Single entry point for calculations, undo/redo and persistence.
///
/// A calculation that fails leaves history and both snapshot stacks
/// untouched. A successful one snapshots the history, appends the record and
/// then notifies every observer.
pub struct Calculator {
    config: Arc<CalculatorConfig>,
    registry: OperationRegistry,
    history: HistoryStore,
    mementos: MementoStack,
    observers: ObserverBus,
    storage: Box<dyn HistorySink>,
}

impl std::fmt::Debug for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calculator")
            .field("history_len", &self.history.len())
            .field("undo_len", &self.mementos.undo_len())
            .field("redo_len", &self.mementos.redo_len())
            .field("observers", &self.observers)
            .finish()
    }
}

impl Calculator {
    /// Builds an empty calculator with the built-in operations.
    pub fn new(config: impl Into<Arc<CalculatorConfig>>) -> Result<Self, CalcError> {
        Self::with_registry(config, OperationRegistry::with_builtins())
    }

    /// Builds an empty calculator around a caller-supplied registry.
    pub fn with_registry(
        config: impl Into<Arc<CalculatorConfig>>,
        registry: OperationRegistry,
    ) -> Result<Self, CalcError> {
        let config = config.into();
        config.validate()?;

        let history_file = config.history_file();
        let mut observers = ObserverBus::new();
        observers.subscribe(Box::new(LoggingObserver));
        if config.auto_save {
            observers.subscribe(Box::new(AutoSaveObserver::new(Box::new(CsvHistoryFile::new(
                history_file.clone(),
            )))));
        }

        info!(
            history_file = %history_file.display(),
            max_history_size = config.max_history_size,
            auto_save = config.auto_save,
            "calculator initialized"
        );

        Ok(Self {
            history: HistoryStore::new(config.max_history_size),
            storage: Box::new(CsvHistoryFile::new(history_file)),
            mementos: MementoStack::new(),
            registry,
            observers,
            config,
        })
    }

    /// Like [`Calculator::new`], then loads the history file if one exists.
    ///
    /// A file that fails to load is logged and ignored.
    pub fn open(config: impl Into<Arc<CalculatorConfig>>) -> Result<Self, CalcError> {
        let mut calc = Self::new(config)?;
        if calc.storage.exists() {
            if let Err(err) = calc.load() {
                warn!(error = %err, "could not load existing history");
            }
        }
        Ok(calc)
    }

    /// Settings this calculator was built with.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Mutable access for registering extra operations.
    pub fn registry_mut(&mut self) -> &mut OperationRegistry {
        &mut self.registry
    }

    /// Operations available to [`Calculator::compute`].
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Appends a listener after the built-in ones.
    pub fn add_observer(&mut self, observer: Box<dyn HistoryObserver>) {
        self.observers.subscribe(observer);
    }

    /// Removes observers by name; returns how many were removed.
    pub fn remove_observer(&mut self, name: &str) -> usize {
        self.observers.unsubscribe(name)
    }

    /// Listener names in notification order.
    pub fn observer_names(&self) -> Vec<&str> {
        self.observers.names()
    }

    /// Parses both operands from text and runs `operation`.
    pub fn compute(&mut self, operation: &str, a: &str, b: &str) -> Result<Number, CalcError> {
        if !self.registry.contains(operation) {
            return Err(OperationError::UnknownOperation(operation.to_string()).into());
        }
        let a = parse_operand(a, &self.config)?;
        let b = parse_operand(b, &self.config)?;
        self.compute_values(operation, a, b)
    }

    /// Runs `operation` on numeric operands and records the result.
    pub fn compute_values(&mut self, operation: &str, a: Number, b: Number) -> Result<Number, CalcError> {
        let calc = Calculation::create(&self.registry, &self.config, operation, a, b).map_err(|err| {
            warn!(operation, error = %err, "calculation rejected");
            err
        })?;

        self.mementos.record(&self.history);
        if let Some(evicted) = self.history.append(calc.clone()) {
            debug!(evicted = %evicted, "oldest calculation evicted");
        }
        let failures = self.observers.notify(&calc, self.history.as_slice());
        if failures > 0 {
            debug!(failures, "observers failed after calculation");
        }
        Ok(calc.result())
    }

    /// Restores the history as it was before the last change.
    pub fn undo(&mut self) -> Result<(), CalcError> {
        self.mementos.undo(&mut self.history)?;
        info!(history_len = self.history.len(), "undo applied");
        Ok(())
    }

    /// Re-applies the most recently undone change.
    pub fn redo(&mut self) -> Result<(), CalcError> {
        self.mementos.redo(&mut self.history)?;
        info!(history_len = self.history.len(), "redo applied");
        Ok(())
    }

    /// Empties the history as an undoable step.
    pub fn clear_history(&mut self) {
        self.mementos.record(&self.history);
        self.history.clear();
        info!("history cleared");
    }

    /// Writes the full history to the configured file.
    pub fn save(&mut self) -> Result<(), CalcError> {
        self.storage.save(self.history.as_slice()).map_err(|err| {
            warn!(error = %err, "failed to save history");
            err
        })?;
        Ok(())
    }

    /// Replaces the history with the configured file's contents.
    ///
    /// All-or-nothing: on error the history is unchanged. On success the
    /// loaded records become a new baseline and both snapshot stacks reset.
    pub fn load(&mut self) -> Result<usize, CalcError> {
        let records = self.storage.load().map_err(|err| {
            warn!(error = %err, "failed to load history");
            err
        })?;
        self.history.replace(records);
        self.mementos.reset();
        info!(records = self.history.len(), "history loaded");
        Ok(self.history.len())
    }

    /// Ordered copy of the history.
    pub fn list_history(&self) -> Vec<Calculation> {
        self.history.as_sequence()
    }

    /// `operation(a, b) = result` lines, oldest first.
    pub fn show_history(&self) -> Vec<String> {
        self.history.iter().map(ToString::to_string).collect()
    }

    /// Borrowed view of the history store.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Whether [`Calculator::undo`] would succeed.
    pub fn can_undo(&self) -> bool {
        self.mementos.undo_len() > 0
    }

    /// Whether [`Calculator::redo`] would succeed.
    pub fn can_redo(&self) -> bool {
        self.mementos.redo_len() > 0
    }

    /// Number of undo snapshots held.
    pub fn undo_len(&self) -> usize {
        self.mementos.undo_len()
    }

    /// Number of redo snapshots held.
    pub fn redo_len(&self) -> usize {
        self.mementos.redo_len()
    }
}
