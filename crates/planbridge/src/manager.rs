//! Background solving with status tracking and termination.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{info, warn};

use planbridge_core::{BridgeError, HostRef, Result};
use planbridge_engine::SolverConfig;

use crate::bridge::Bridge;

/// Lifecycle of a managed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// No solve has been started yet.
    NotStarted,
    /// A solver thread is running.
    Solving,
    /// The solve finished or was terminated; a result is available.
    Terminated,
}

/// Runs solves on a background thread against one bridge.
///
/// One solve at a time: starting a second solve while one is running is an
/// error. Termination is cooperative, the solver observes the flag at step
/// boundaries and returns its best-so-far solution.
pub struct SolverManager {
    bridge: Arc<Bridge>,
    terminate: Arc<AtomicBool>,
    status: Arc<Mutex<SolveStatus>>,
    result: Arc<Mutex<Option<Result<HostRef>>>>,
    handle: Option<JoinHandle<()>>,
}

impl SolverManager {
    /// Creates a manager around a bridge.
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self {
            bridge,
            terminate: Arc::new(AtomicBool::new(false)),
            status: Arc::new(Mutex::new(SolveStatus::NotStarted)),
            result: Arc::new(Mutex::new(None)),
            handle: None,
        }
    }

    /// The bridge this manager solves through.
    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SolveStatus {
        *self.status.lock().unwrap()
    }

    /// Starts a background solve.
    pub fn solve_async(&mut self, config: SolverConfig, problem: HostRef) -> Result<()> {
        if self.status() == SolveStatus::Solving {
            return Err(BridgeError::Config(
                "a solve is already running on this manager".into(),
            ));
        }
        self.terminate.store(false, Ordering::SeqCst);
        *self.result.lock().unwrap() = None;
        *self.status.lock().unwrap() = SolveStatus::Solving;

        let bridge = Arc::clone(&self.bridge);
        let terminate = Arc::clone(&self.terminate);
        let status = Arc::clone(&self.status);
        let result = Arc::clone(&self.result);
        self.handle = Some(std::thread::spawn(move || {
            info!(event = "managed_solve_start");
            let outcome = bridge.solve_with_controls(&config, &problem, &terminate);
            if let Err(err) = &outcome {
                warn!(event = "managed_solve_failed", error = %err);
            }
            *result.lock().unwrap() = Some(outcome);
            *status.lock().unwrap() = SolveStatus::Terminated;
        }));
        Ok(())
    }

    /// Requests termination and waits for the solver thread to finish.
    pub fn terminate(&mut self) {
        self.terminate.store(true, Ordering::SeqCst);
        self.join();
    }

    /// Waits for the running solve (if any) to finish.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Takes the finished solve's result, if one is available.
    pub fn take_result(&mut self) -> Option<Result<HostRef>> {
        self.result.lock().unwrap().take()
    }

    /// Blocks until the solve finishes and returns its result.
    pub fn solve_blocking(&mut self, config: SolverConfig, problem: HostRef) -> Result<HostRef> {
        self.solve_async(config, problem)?;
        self.join();
        self.take_result()
            .unwrap_or_else(|| Err(BridgeError::Internal("solver thread left no result".into())))
    }
}

impl Drop for SolverManager {
    fn drop(&mut self) {
        self.terminate.store(true, Ordering::SeqCst);
        self.join();
    }
}
