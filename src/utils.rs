use std::{thread, time::Duration};

/// Log target shared by the state machine diagnostics.
pub const SM_LOG_TARGET: &str = "xv_hdmi_rx::sm";

/// General receiver diagnostics, gated by [`RxConfig::debug_prints`](crate::hdmi_rx::RxConfig).
#[macro_export]
macro_rules! rx_log {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            log::debug!(target: $crate::utils::SM_LOG_TARGET, $($arg)+);
        }
    };
}

/// One line per transition, gated by [`RxConfig::trace_transitions`](crate::hdmi_rx::RxConfig).
#[macro_export]
macro_rules! sm_log {
    ($enabled:expr, $event:expr, $from:expr, $to:expr) => {
        if $enabled {
            log::debug!(
                target: $crate::utils::SM_LOG_TARGET,
                "Event {} : < State {} -> State {} >",
                $event,
                $from,
                $to
            );
        }
    };
}

/// Bound for busy-wait loops on hardware status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    /// Pause after each failed attempt. Zero spins without sleeping.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: usize, backoff: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(10_000, Duration::ZERO)
    }
}

// ==== general ====
/// Calls `callback` until it succeeds or `policy.max_attempts` calls have failed.
/// Returns the last error when the budget is spent. The backoff only separates
/// attempts, there is no pause after the last one.
pub fn retry_with_timeout<R, F>(policy: RetryPolicy, mut callback: F) -> anyhow::Result<R>
where
    F: FnMut() -> anyhow::Result<R>,
{
    let mut last = None;
    for attempt in 1..=policy.max_attempts {
        match callback() {
            Ok(v) => return Ok(v),
            Err(e) => last = Some(e),
        }
        if attempt < policy.max_attempts && !policy.backoff.is_zero() {
            thread::sleep(policy.backoff);
        }
    }
    Err(last.unwrap_or_else(|| anyhow::anyhow!("retry budget is zero")))
}

/// Spins on `ready` under `policy`. Returns the number of attempts used.
pub fn wait_until<F>(policy: RetryPolicy, mut ready: F) -> anyhow::Result<usize>
where
    F: FnMut() -> bool,
{
    let mut attempts = 0;
    retry_with_timeout(policy, || {
        attempts += 1;
        if ready() {
            Ok(attempts)
        } else {
            anyhow::bail!("not ready after {} attempts", attempts)
        }
    })
}
