//! Timeout enforcement.
//!
//! # Responsibilities
//! - Poll a readiness condition with a fixed interval and optional bound
//! - Wrap I/O futures with an optional deadline
//!
//! # Design Decisions
//! - Uses Tokio's timer; every wait yields between checks
//! - `None` means wait forever, matching the device's own behavior

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};

/// A bounded wait expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("condition not met after {waited:?} ({polls} polls)")]
pub struct WaitTimedOut {
    pub waited: Duration,
    pub polls: u32,
}

/// Poll `ready` every `interval` until it returns true.
///
/// Returns the number of polls performed. With `limit` set, gives up once
/// that much time has elapsed without success.
pub async fn wait_until<F>(
    mut ready: F,
    interval: Duration,
    limit: Option<Duration>,
) -> Result<u32, WaitTimedOut>
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    let mut polls = 0u32;

    loop {
        polls = polls.saturating_add(1);
        if ready() {
            return Ok(polls);
        }

        let waited = started.elapsed();
        if matches!(limit, Some(limit) if waited >= limit) {
            return Err(WaitTimedOut { waited, polls });
        }

        time::sleep(interval).await;
    }
}

/// Await `fut`, bounded by `deadline` when one is given.
pub async fn with_deadline<F: Future>(
    deadline: Option<Duration>,
    fut: F,
) -> Result<F::Output, time::error::Elapsed> {
    match deadline {
        Some(deadline) => time::timeout(deadline, fut).await,
        None => Ok(fut.await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ready_immediately_takes_no_time() {
        let start = Instant::now();
        let polls = wait_until(|| true, Duration::from_millis(1), None).await;
        assert_eq!(polls, Ok(1));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_wait_polls_until_ready() {
        let mut remaining = 25;
        let start = Instant::now();
        let polls = wait_until(
            || {
                if remaining == 0 {
                    return true;
                }
                remaining -= 1;
                false
            },
            Duration::from_millis(2),
            None,
        )
        .await;

        assert_eq!(polls, Ok(26));
        assert_eq!(start.elapsed(), Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_gives_up() {
        let err = wait_until(|| false, Duration::from_millis(1), Some(Duration::from_millis(10)))
            .await
            .unwrap_err();
        assert_eq!(err.waited, Duration::from_millis(10));
        assert_eq!(err.polls, 11);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_is_optional() {
        let slow = time::sleep(Duration::from_secs(60));
        assert!(with_deadline(Some(Duration::from_secs(1)), slow).await.is_err());
        assert_eq!(with_deadline(None, async { 7 }).await.unwrap(), 7);
    }
}
