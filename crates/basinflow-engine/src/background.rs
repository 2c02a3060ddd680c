//! Runs on a dedicated worker thread.
//!
//! [`BackgroundRun`] moves one simulation onto its own thread so the host
//! stays responsive. Progress arrives as [`RunEvent`]s on a channel and
//! the outcome is collected with [`wait`](BackgroundRun::wait).
//!
//! ```text
//! Host thread                        Worker thread
//!     |                                   |
//!     |--spawn()------------------------->| slot claimed
//!     |                                   | Simulation::execute()
//!     |<--RunEvent::Progress--------------|   (each reported step)
//!     |--cancel()------------------------>|   checked between steps
//!     |<--RunEvent::Finished--------------| slot released
//!     |--wait()-------------------------->| join
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use basinflow_core::ModelState;
use crossbeam_channel::{Receiver, TryRecvError};

use crate::cancel::CancelToken;
use crate::error::RunError;
use crate::orchestrator::{RunOutput, Simulation};
use crate::progress::Progress;
use crate::slot::RunSlot;

/// Notification from a background run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunEvent {
    /// A progress report.
    Progress(Progress),
    /// The run ended. The slot is already free when this arrives.
    Finished {
        /// Whether a result was produced.
        succeeded: bool,
    },
}

/// Handle to a simulation running on a worker thread.
///
/// Dropping the handle without calling [`wait`](Self::wait) cancels the
/// run and joins the worker.
pub struct BackgroundRun {
    cancel: CancelToken,
    events: Receiver<RunEvent>,
    handle: Option<JoinHandle<Result<RunOutput, RunError>>>,
}

impl BackgroundRun {
    /// Claim `slot` and start simulating `model` on a new thread.
    ///
    /// Fails with [`RunError::Busy`] if the slot is held, or
    /// [`RunError::ThreadSpawnFailed`] if the OS refuses the thread. In
    /// both cases no run is started and the slot is left as it was.
    pub fn spawn(
        simulation: Arc<Simulation>,
        model: ModelState,
        slot: &RunSlot,
    ) -> Result<Self, RunError> {
        let guard = slot.try_begin()?;
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let (tx, rx) = crossbeam_channel::unbounded();

        let handle = thread::Builder::new()
            .name("basinflow-run".into())
            .spawn(move || {
                let outcome = simulation.execute(&model, &worker_cancel, &mut |p| {
                    // The host may have stopped listening; the run goes on.
                    let _ = tx.send(RunEvent::Progress(p));
                });
                drop(guard);
                let _ = tx.send(RunEvent::Finished {
                    succeeded: outcome.is_ok(),
                });
                outcome
            })
            .map_err(|e| RunError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;

        Ok(Self {
            cancel,
            events: rx,
            handle: Some(handle),
        })
    }

    /// Request cancellation. The worker stops before its next step.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The event channel.
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Next event without blocking, if one is queued.
    pub fn try_next_event(&self) -> Option<RunEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Block until the worker exits and return its outcome.
    pub fn wait(mut self) -> Result<RunOutput, RunError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| RunError::WorkerPanicked)?,
            None => Err(RunError::WorkerPanicked),
        }
    }
}

impl Drop for BackgroundRun {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.cancel();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use basinflow_core::Quantity;
    use basinflow_test_utils::{layered_column, ConstStage, FailingStage};

    fn simulation(stage: ConstStage) -> Arc<Simulation> {
        Arc::new(Simulation::new(SimulationConfig::new(vec![Box::new(stage)])).unwrap())
    }

    #[test]
    fn background_run_delivers_result_and_events() {
        let sim = simulation(ConstStage::new("const", Quantity::Temperature, 5.0));
        let slot = RunSlot::new();
        let run = BackgroundRun::spawn(sim, layered_column(), &slot).unwrap();
        let events: Vec<RunEvent> = run.events().iter().collect();
        let output = run.wait().unwrap();

        assert!(!output.result.time_steps().is_empty());
        assert_eq!(events.last(), Some(&RunEvent::Finished { succeeded: true }));
        let last_progress = events.iter().rev().find_map(|e| match e {
            RunEvent::Progress(p) => Some(p.percent),
            _ => None,
        });
        assert_eq!(last_progress, Some(100.0));
        assert!(!slot.is_active());
    }

    #[test]
    fn second_run_on_same_slot_is_busy() {
        let sim = simulation(ConstStage::new("const", Quantity::Temperature, 5.0));
        let slot = RunSlot::new();
        let _held = slot.try_begin().unwrap();
        match BackgroundRun::spawn(sim, layered_column(), &slot) {
            Err(RunError::Busy) => {}
            Err(other) => panic!("expected Busy, got {other:?}"),
            Ok(_) => panic!("expected Busy, got a running handle"),
        }
    }

    #[test]
    fn failed_run_reports_and_frees_slot() {
        let sim = Arc::new(
            Simulation::new(SimulationConfig::new(vec![Box::new(FailingStage::new(
                "flaky",
                Quantity::Temperature,
                0,
            ))]))
            .unwrap(),
        );
        let slot = RunSlot::new();
        let run = BackgroundRun::spawn(sim, layered_column(), &slot).unwrap();
        let events: Vec<RunEvent> = run.events().iter().collect();
        match run.wait() {
            Err(RunError::Step(_)) => {}
            other => panic!("expected Step, got {other:?}"),
        }
        assert_eq!(events, vec![RunEvent::Finished { succeeded: false }]);
        assert!(!slot.is_active());
    }

    #[test]
    fn dropping_the_handle_releases_the_slot() {
        let sim = simulation(ConstStage::new("const", Quantity::Temperature, 5.0));
        let slot = RunSlot::new();
        let run = BackgroundRun::spawn(sim, layered_column(), &slot).unwrap();
        drop(run);
        assert!(!slot.is_active());
        assert!(slot.try_begin().is_ok());
    }
}
