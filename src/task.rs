//! Background work for the single-threaded view loop.
//!
//! A [`Task`] runs a blocking remote call on an [`Executor`] and hands the
//! result back over a channel, so the loop thread is the only place view
//! state changes. Each task carries a [`Liveness`] token: once the owner is
//! dropped (the view unmounted) the worker discards its result instead of
//! delivering it.

use crate::remote::HttpError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where task bodies run
pub trait Executor {
    fn spawn(&self, job: Job);
}

/// Runs every job on its own worker thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor {
    fn spawn(&self, job: Job) {
        thread::spawn(job);
    }
}

/// Shared flag saying whether the owner of a task is still mounted
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn revoke(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// An in-flight remote operation owned by a view
pub struct Task<T> {
    rx: Receiver<Result<T, HttpError>>,
    liveness: Liveness,
}

impl<T: Send + 'static> Task<T> {
    pub fn spawn<F>(executor: &dyn Executor, work: F) -> Self
    where
        F: FnOnce() -> Result<T, HttpError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let liveness = Liveness::new();
        let token = liveness.clone();

        executor.spawn(Box::new(move || {
            let result = work();
            if token.is_alive() {
                // The receiver may still vanish between the check and the send
                let _ = tx.send(result);
            }
        }));

        Self { rx, liveness }
    }
}

impl<T> Task<T> {
    /// Non-blocking check for a result
    pub fn poll(&self) -> Option<Result<T, HttpError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Block the loop thread until the result arrives or `timeout` passes
    pub fn wait(&self, timeout: Duration) -> Option<Result<T, HttpError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    #[cfg(test)]
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }
}

impl<T> Drop for Task<T> {
    fn drop(&mut self) {
        self.liveness.revoke();
    }
}

fn worker_lost() -> HttpError {
    HttpError::unexpected("Background request ended without a result")
}

#[cfg(test)]
pub use manual::ManualExecutor;


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_manual_task_delivers_after_run() {
        let exec = ManualExecutor::new();
        let task = Task::spawn(&exec, || Ok(42));
        assert!(task.poll().is_none());
        assert_eq!(exec.pending(), 1);

        exec.run_all();
        assert_eq!(task.poll(), Some(Ok(42)));
    }

    #[test]
    fn test_dropped_task_discards_result() {
        let exec = ManualExecutor::new();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        let task = Task::spawn(&exec, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, HttpError>("late")
        });
        let token = task.liveness();
        assert!(token.is_alive());

        drop(task);
        assert!(!token.is_alive());

        // Resolving after the owner is gone neither panics nor delivers
        exec.run_all();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_task_wait() {
        let task = Task::spawn(&ThreadExecutor, || {
            thread::sleep(Duration::from_millis(10));
            Err::<(), _>(HttpError::new(503, "busy"))
        });
        let result = task.wait(Duration::from_secs(5)).unwrap();
        assert!(result.unwrap_err().is_status(503));
    }

    #[test]
    fn test_wait_times_out_on_pending_job() {
        let exec = ManualExecutor::new();
        let task = Task::spawn(&exec, || Ok(1));
        assert!(task.wait(Duration::from_millis(5)).is_none());
    }

    #[test]
    fn test_lost_worker_reports_failure() {
        let exec = ManualExecutor::new();
        let task: Task<u8> = Task::spawn(&exec, || Ok(1));
        // Discarding the queued job drops the sender without a result
        assert_eq!(exec.discard_all(), 1);
        let err = task.poll().unwrap().unwrap_err();
        assert_eq!(err.status, crate::remote::Status::Unexpected);
    }
}
