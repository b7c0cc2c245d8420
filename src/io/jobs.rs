// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background work for the UI thread.
//!
//! Network calls run on short-lived worker threads and report back through
//! mpsc channels drained once per frame, so the UI never blocks.  While a
//! job is pending its triggering control stays disabled, which keeps at
//! most one request in flight per logical action.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::io::gateway::Gateway;
use crate::models::session::AugmentationProgress;

/// Handle to a running background job.
pub struct Pending<T> {
    rx: Receiver<Result<T>>,
}

/// Run `job` on a worker thread.
pub fn spawn<T, F>(job: F) -> Pending<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = channel();
    thread::spawn(move || {
        let _ = tx.send(job());
    });
    Pending { rx }
}

impl<T> Pending<T> {
    /// The job result, once finished.  A worker that died without reporting
    /// comes back as an error rather than silence.
    pub fn poll(&self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err(anyhow::anyhow!("background worker died unexpectedly")))
            }
        }
    }
}

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const POLL_RETRY_INTERVAL: Duration = Duration::from_secs(2);
/// Consecutive failed polls tolerated before the poller gives up.
pub const MAX_POLL_FAILURES: u32 = 30;

#[derive(Debug)]
pub enum PollUpdate {
    Progress(AugmentationProgress),
    Failed(String),
}

/// A cancellable augmentation progress poller.  Polling stops when the
/// server reports completion, when [`ProgressPoller::stop`] is called (the
/// modal closed), or after [`MAX_POLL_FAILURES`] consecutive failures.
pub struct ProgressPoller {
    rx: Receiver<PollUpdate>,
    stop: Arc<AtomicBool>,
}

pub fn poll_augmentation(gateway: Gateway, session: String) -> ProgressPoller {
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = channel();
    let flag = Arc::clone(&stop);

    thread::spawn(move || {
        let mut failures = 0u32;
        loop {
            if flag.load(Ordering::Relaxed) {
                log::info!("Augmentation poll for '{}' cancelled", session);
                break;
            }
            match gateway.augmentation_progress(&session) {
                Ok(progress) => {
                    failures = 0;
                    let completed = progress.completed;
                    if tx.send(PollUpdate::Progress(progress)).is_err() {
                        break;
                    }
                    if completed {
                        log::info!("Augmentation for '{}' completed", session);
                        break;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    failures += 1;
                    if failures >= MAX_POLL_FAILURES {
                        let _ = tx.send(PollUpdate::Failed(format!(
                            "gave up after {} failed progress checks: {}",
                            failures, err
                        )));
                        break;
                    }
                    log::warn!(
                        "Augmentation progress poll failed ({}/{}): {}",
                        failures,
                        MAX_POLL_FAILURES,
                        err
                    );
                    thread::sleep(POLL_RETRY_INTERVAL);
                }
            }
        }
    });

    ProgressPoller { rx, stop }
}

impl ProgressPoller {
    pub fn poll(&self) -> Option<PollUpdate> {
        self.rx.try_recv().ok()
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_for<T>(pending: &Pending<T>) -> Result<T> {
        for _ in 0..500 {
            if let Some(result) = pending.poll() {
                return result;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("background job did not finish in time");
    }

    #[test]
    fn test_spawn_delivers_result() {
        let pending = spawn(|| Ok(21 * 2));
        assert_eq!(wait_for(&pending).unwrap(), 42);
    }

    #[test]
    fn test_spawn_delivers_error() {
        let pending: Pending<()> = spawn(|| anyhow::bail!("backend unreachable"));
        let err = wait_for(&pending).unwrap_err();
        assert!(err.to_string().contains("backend unreachable"));
    }

    #[test]
    fn test_poll_before_completion_is_none() {
        let pending = spawn(|| {
            thread::sleep(Duration::from_millis(100));
            Ok(())
        });
        assert!(pending.poll().is_none());
        wait_for(&pending).unwrap();
    }
}
