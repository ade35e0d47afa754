use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use crate::{
    calculation::Calculation,
    calculator::{CalcError, Calculator},
    types::Number,
};

use super::events::CalcEvent;

const COMMAND_QUEUE_BOUND: usize = 256;
const EVENT_QUEUE_BOUND: usize = 1024;

/// Failures returned through a [`CalculatorHandle`].
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The calculator rejected the command.
    #[error(transparent)]
    Calc(#[from] CalcError),
    /// The command loop has stopped.
    #[error("calculator runtime is no longer running")]
    ChannelClosed,
}

/// Cloneable handle to a calculator owned by a single background task.
///
/// Every command is processed to completion before the next one starts, so
/// concurrent callers never observe a half-applied snapshot/history pair.
#[derive(Clone)]
pub struct CalculatorHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<CalcEvent>,
}

enum Command {
    Compute {
        operation: String,
        a: String,
        b: String,
        resp: oneshot::Sender<Result<Number, RuntimeError>>,
    },
    Undo {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Redo {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Clear {
        resp: oneshot::Sender<()>,
    },
    Save {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Load {
        resp: oneshot::Sender<Result<usize, RuntimeError>>,
    },
    List {
        resp: oneshot::Sender<Vec<Calculation>>,
    },
    Shutdown {
        resp: oneshot::Sender<Calculator>,
    },
}

/// Moves `calculator` onto a blocking worker thread and returns its handle.
///
/// Commands run off the async executor since saves and auto-save observers
/// block on file I/O. Must be called from within a tokio runtime.
pub fn spawn_calculator(calculator: Calculator) -> CalculatorHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(COMMAND_QUEUE_BOUND);
    let (events_tx, _) = broadcast::channel::<CalcEvent>(EVENT_QUEUE_BOUND);

    let events_tx_loop = events_tx.clone();
    tokio::task::spawn_blocking(move || {
        let mut calculator = calculator;
        while let Some(cmd) = cmd_rx.blocking_recv() {
            if let Some(resp) = handle_command(cmd, &mut calculator, &events_tx_loop) {
                let _ = resp.send(calculator);
                break;
            }
        }
        debug!("calculator runtime stopped");
    });

    CalculatorHandle { cmd_tx, events_tx }
}

impl CalculatorHandle {
    /// Receiver for events emitted after each applied command.
    pub fn subscribe(&self) -> broadcast::Receiver<CalcEvent> {
        self.events_tx.subscribe()
    }

    /// See [`Calculator::compute`].
    pub async fn compute(
        &self,
        operation: impl Into<String>,
        a: impl Into<String>,
        b: impl Into<String>,
    ) -> Result<Number, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Compute {
            operation: operation.into(),
            a: a.into(),
            b: b.into(),
            resp: tx,
        })
        .await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`Calculator::undo`].
    pub async fn undo(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Undo { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`Calculator::redo`].
    pub async fn redo(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Redo { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`Calculator::clear_history`].
    pub async fn clear_history(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Clear { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// See [`Calculator::save`].
    pub async fn save(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Save { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`Calculator::load`].
    pub async fn load(&self) -> Result<usize, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Load { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// See [`Calculator::list_history`].
    pub async fn list_history(&self) -> Result<Vec<Calculation>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::List { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Stops the loop and hands the calculator back.
    pub async fn shutdown(&self) -> Result<Calculator, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown { resp: tx }).await?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    async fn send(&self, cmd: Command) -> Result<(), RuntimeError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::ChannelClosed)
    }
}

/// Applies one command; returns the shutdown responder when the loop must stop.
fn handle_command(
    cmd: Command,
    calculator: &mut Calculator,
    events_tx: &broadcast::Sender<CalcEvent>,
) -> Option<oneshot::Sender<Calculator>> {
    match cmd {
        Command::Compute {
            operation,
            a,
            b,
            resp,
        } => {
            let res = calculator.compute(&operation, &a, &b);
            if let Ok(result) = res {
                let _ = events_tx.send(CalcEvent::Computed { operation, result });
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Undo { resp } => {
            let res = calculator.undo();
            if res.is_ok() {
                let _ = events_tx.send(CalcEvent::UndoApplied);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Redo { resp } => {
            let res = calculator.redo();
            if res.is_ok() {
                let _ = events_tx.send(CalcEvent::RedoApplied);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Clear { resp } => {
            calculator.clear_history();
            let _ = events_tx.send(CalcEvent::Cleared);
            let _ = resp.send(());
        }
        Command::Save { resp } => {
            let res = calculator.save();
            if res.is_ok() {
                let _ = events_tx.send(CalcEvent::Saved);
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::Load { resp } => {
            let res = calculator.load();
            if let Ok(records) = res {
                let _ = events_tx.send(CalcEvent::Loaded { records });
            }
            let _ = resp.send(res.map_err(RuntimeError::from));
        }
        Command::List { resp } => {
            let _ = resp.send(calculator.list_history());
        }
        Command::Shutdown { resp } => return Some(resp),
    }
    None
}
