//! Bounded polling for asynchronous page state.

use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::time::{sleep, Instant};

use crate::error::Result;

/// Result of a bounded wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Ready(T),
    TimedOut,
}

impl<T> WaitOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::TimedOut => None,
        }
    }
}

/// Polls a condition until it yields a value or the timeout elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Same polling interval, different bound.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Runs `check` until it returns `Some`.
    ///
    /// The check always runs at least once, and once more when the deadline is
    /// reached. Errors from the check end the wait immediately.
    pub async fn until<T, F, Fut>(&self, mut check: F) -> Result<WaitOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        let mut polls = 0usize;
        loop {
            polls += 1;
            if let Some(value) = check().await? {
                return Ok(WaitOutcome::Ready(value));
            }
            let now = Instant::now();
            if now >= deadline {
                debug!("Wait gave up after {polls} polls ({:?})", self.timeout);
                return Ok(WaitOutcome::TimedOut);
            }
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
