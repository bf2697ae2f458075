//! Settle delays and condition polling.
//!
//! Timeouts are reported as `false`, never as errors, so callers pick their
//! own fallback.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::trace;

/// Suspend the current fill for at least `duration`.
pub async fn wait(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

/// Poll `predicate` every `poll_interval` until it holds or `timeout` elapses.
///
/// The predicate is always evaluated at least once, so a zero timeout is a
/// single check.
pub async fn wait_until<F, Fut>(mut predicate: F, timeout: Duration, poll_interval: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let met = try_wait_until(
        || {
            let check = predicate();
            async move { Ok::<_, Infallible>(check.await) }
        },
        timeout,
        poll_interval,
    )
    .await;
    match met {
        Ok(met) => met,
        Err(never) => match never {},
    }
}

/// Like [`wait_until`], but the first `Err` from `predicate` ends the wait
/// and is returned as is.
///
/// A timeout too large to represent as a deadline polls without one.
pub async fn try_wait_until<F, Fut, E>(
    mut predicate: F,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let deadline = Instant::now().checked_add(timeout);
    let mut polls = 0u32;
    loop {
        polls += 1;
        if predicate().await? {
            trace!(polls, "condition met");
            return Ok(true);
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    trace!(polls, ?timeout, "condition timed out");
                    return Ok(false);
                }
                poll_interval.min(deadline - now)
            }
            None => poll_interval,
        };
        sleep(pause.max(Duration::from_millis(1))).await;
    }
}
