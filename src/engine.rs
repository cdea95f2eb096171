//! One acquisition → evaluation → dispatch cycle

use crate::alert::{DispatchReport, Dispatcher};
use crate::core::AlertError;
use crate::data::{HistoryLog, SnapshotAcquirer};
use crate::signals::SignalEvaluator;

/// Result of a cycle. Every variant is a normal completion.
#[derive(Debug)]
pub enum CycleOutcome {
    /// No snapshot could be obtained; prior cache untouched
    AcquisitionFailed(AlertError),
    /// Snapshot evaluated, no alert lines produced
    NothingToSend { contracts: usize },
    /// All chunks delivered
    Delivered(DispatchReport),
    /// Sink rejected a chunk; earlier chunks may have been delivered
    DispatchFailed(AlertError),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::NothingToSend { .. } | CycleOutcome::Delivered(_))
    }
}

/// Runs the alert pipeline once per call
pub struct Engine {
    acquirer: SnapshotAcquirer,
    evaluator: Box<dyn SignalEvaluator>,
    dispatcher: Dispatcher,
    history: Option<HistoryLog>,
}

impl Engine {
    pub fn new(
        acquirer: SnapshotAcquirer,
        evaluator: Box<dyn SignalEvaluator>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            acquirer,
            evaluator,
            dispatcher,
            history: None,
        }
    }

    /// Consult daily open-interest logs when evaluating
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = Some(history);
        self
    }

    /// Run one full cycle. Never panics and never propagates errors;
    /// the outcome says what happened.
    pub fn run_cycle(&self) -> CycleOutcome {
        let snapshot = match self.acquirer.acquire() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!("Failed to fetch live data: {}", e);
                return CycleOutcome::AcquisitionFailed(e);
            }
        };
        tracing::info!(
            "{} snapshot: spot {:.2}, {} contracts",
            snapshot.symbol,
            snapshot.spot,
            snapshot.len()
        );

        let rolling = self.history.as_ref().map(|h| h.rolling_averages());

        let lines = self.evaluator.evaluate(&snapshot, rolling.as_ref());
        if lines.is_empty() {
            tracing::info!("No actionable alerts found ({} evaluator)", self.evaluator.name());
            return CycleOutcome::NothingToSend {
                contracts: snapshot.len(),
            };
        }

        match self.dispatcher.dispatch(&lines) {
            Ok(report) => CycleOutcome::Delivered(report),
            Err(e) => {
                tracing::error!("Alert delivery failed: {}", e);
                CycleOutcome::DispatchFailed(e)
            }
        }
    }
}
