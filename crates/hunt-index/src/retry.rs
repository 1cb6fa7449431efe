//! Bounded retry for index writes.
//!
//! Index files can be held briefly by other processes (virus scanners, backup tools, a
//! second writer shutting down). Writes are retried with a linearly growing pause; a
//! callback inspects each failure and decides how to continue.

use std::{thread, time::Duration};

use tracing::warn;

use crate::IndexError;

/// Attempts made by [`RetryPolicy::default`].
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try again unchanged.
    Retry,
    /// Resource use was reduced; try again.
    Degrade,
    /// Stop and report the failure.
    Abort,
}

/// Retry settings.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts before giving up.
    pub max_attempts: u32,
    /// Pause after the first failure; the nth failure pauses n times this long.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without pausing.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    /// Runs `op` until it succeeds, `on_error` aborts, or attempts run out.
    ///
    /// The last error is returned on failure.
    pub fn run<T>(
        &self,
        mut op: impl FnMut() -> Result<T, IndexError>,
        mut on_error: impl FnMut(&IndexError) -> RetryDecision,
    ) -> Result<T, IndexError> {
        let mut attempt = 1;
        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let decision = on_error(&err);
            if decision == RetryDecision::Abort || attempt >= self.max_attempts {
                warn!(attempt, error = %err, "index write failed");
                return Err(err);
            }
            warn!(attempt, ?decision, error = %err, "index write failed, retrying");
            if !self.delay.is_zero() {
                thread::sleep(self.delay * attempt);
            }
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = RetryPolicy::immediate(10).run(
            || {
                calls += 1;
                if calls < 3 {
                    Err(IndexError::Locked("busy".into()))
                } else {
                    Ok(calls)
                }
            },
            |_| RetryDecision::Retry,
        );
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = RetryPolicy::immediate(4).run(
            || {
                calls += 1;
                Err(IndexError::Write("nope".into()))
            },
            |_| RetryDecision::Degrade,
        );
        assert!(matches!(result, Err(IndexError::Write(_))));
        assert_eq!(calls, 4);
    }

    #[test]
    fn abort_stops_immediately() {
        let mut calls = 0;
        let mut seen = Vec::new();
        let result: Result<(), _> = RetryPolicy::immediate(10).run(
            || {
                calls += 1;
                Err(IndexError::Commit("bad".into()))
            },
            |err| {
                seen.push(err.to_string());
                RetryDecision::Abort
            },
        );
        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert_eq!(seen, vec!["failed to commit index: bad"]);
    }
}
