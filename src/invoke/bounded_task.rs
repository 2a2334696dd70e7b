use std::any::Any;
use std::panic::Location;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{FigureError, FigureResult};
use crate::invoke::CancelToken;

/// Handle to one operation running on its own dedicated worker thread.
///
/// Every task owns a fresh thread; nothing is pooled, so a worker left running
/// after a timeout never delays later tasks.
#[derive(Debug)]
pub struct BoundedTask<T> {
    label: String,
    receiver: mpsc::Receiver<FigureResult<T>>,
    handle: JoinHandle<()>,
    token: CancelToken,
}

/// Starts `operation` immediately on a new worker named after `label`.
pub fn spawn_bounded<T, F>(label: impl Into<String>, operation: F) -> FigureResult<BoundedTask<T>>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> FigureResult<T> + Send + 'static,
{
    let label = label.into();
    let token = CancelToken::new();
    let worker_token = token.clone();
    // Capacity 1: the worker's single send never blocks, even once nobody waits.
    let (sender, receiver) = mpsc::sync_channel(1);

    let worker_label = label.clone();
    let handle = thread::Builder::new()
        .name(thread_name(&label))
        .spawn(move || {
            let result = operation(&worker_token);
            if sender.send(result).is_err() {
                trace!(figure = %worker_label, "late result discarded");
            }
        })
        .map_err(FigureError::WorkerSpawn)?;

    Ok(BoundedTask {
        label,
        receiver,
        handle,
        token,
    })
}

impl<T> BoundedTask<T> {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Waits at most `timeout` for the worker's result.
    ///
    /// On timeout the token is cancelled and the worker is detached rather
    /// than joined, so control returns as soon as the deadline passes.
    pub fn wait(self, timeout: Duration) -> FigureResult<T> {
        let Self {
            label,
            receiver,
            handle,
            token,
        } = self;

        match receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                token.cancel();
                debug!(
                    figure = %label,
                    timeout_ms = timeout.as_millis() as u64,
                    "worker missed its deadline; detaching"
                );
                drop(handle);
                Err(FigureError::Timeout {
                    seconds: timeout.as_secs_f64(),
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                let message = match handle.join() {
                    Err(payload) => panic_message(payload.as_ref()),
                    Ok(()) => "worker exited without a result".to_owned(),
                };
                Err(FigureError::WorkerPanicked { message })
            }
        }
    }
}

/// Runs `operation` on a dedicated worker, waiting at most `timeout`.
///
/// Exactly one attempt is made. The operation's own error is returned as-is;
/// a missed deadline yields `FigureError::Timeout`. The worker is named after
/// the calling file and line.
#[track_caller]
pub fn run_with_timeout<T, F>(timeout: Duration, operation: F) -> FigureResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> FigureResult<T> + Send + 'static,
{
    run_named_with_timeout(caller_label(Location::caller()), timeout, operation)
}

/// `run_with_timeout` on a worker named after `label`.
pub fn run_named_with_timeout<T, F>(
    label: impl Into<String>,
    timeout: Duration,
    operation: F,
) -> FigureResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> FigureResult<T> + Send + 'static,
{
    if timeout.is_zero() {
        return Err(FigureError::InvalidConfig(
            "timeout must be > 0".to_owned(),
        ));
    }
    spawn_bounded(label, operation)?.wait(timeout)
}

/// `run_with_timeout` with the deadline given in seconds.
#[track_caller]
pub fn run_with_timeout_secs<T, F>(timeout_secs: f64, operation: F) -> FigureResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> FigureResult<T> + Send + 'static,
{
    let label = caller_label(Location::caller());
    run_named_with_timeout(label, timeout_from_secs(timeout_secs)?, operation)
}

fn caller_label(location: &Location<'_>) -> String {
    let file = Path::new(location.file())
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("worker");
    format!("{file}:{}", location.line())
}

pub(crate) fn timeout_from_secs(timeout_secs: f64) -> FigureResult<Duration> {
    if !timeout_secs.is_finite() || timeout_secs <= 0.0 {
        return Err(FigureError::InvalidConfig(format!(
            "timeout must be finite and > 0, got {timeout_secs}"
        )));
    }
    Duration::try_from_secs_f64(timeout_secs)
        .map_err(|err| FigureError::InvalidConfig(format!("timeout {timeout_secs}s: {err}")))
}

// std refuses thread names with interior NUL bytes.
fn thread_name(label: &str) -> String {
    format!("figure-{}", label.replace('\0', "_"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
