use std::time::Duration;

use rand::Rng;

/// Attempts per match id, shared by network failures and rate-limit waits.
pub const MAX_ATTEMPTS: u32 = 3;

/// Wait used when a 429 carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Exponential backoff after a network failure on attempt `attempt`
/// (0-based): `2^attempt` seconds plus `jitter` seconds.
pub fn backoff_delay(attempt: u32, jitter: f64) -> Duration {
    let base = 2f64.powi(attempt.min(16) as i32);
    Duration::from_secs_f64(base + jitter.clamp(0.0, 1.0))
}

/// Uniform jitter in [0, 1).
///
/// Kept out of async code so the thread-local rng never lives across an
/// await point.
pub fn jitter() -> f64 {
    rand::thread_rng().gen_range(0.0..1.0)
}

/// Interpret a `Retry-After` header value as whole seconds.
pub fn parse_retry_after(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        assert_relative_eq!(backoff_delay(0, 0.0).as_secs_f64(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(backoff_delay(1, 0.0).as_secs_f64(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(backoff_delay(2, 0.0).as_secs_f64(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_backoff_adds_jitter() {
        assert_relative_eq!(backoff_delay(1, 0.25).as_secs_f64(), 2.25, epsilon = 1e-9);
        // Worst-case jitter on one attempt never overtakes the next attempt
        assert!(backoff_delay(0, 0.999) < backoff_delay(1, 0.0));
    }

    #[test]
    fn test_jitter_range() {
        for _ in 0..1000 {
            let j = jitter();
            assert!((0.0..1.0).contains(&j));
        }
    }

    #[test]
    fn test_retry_after_seconds() {
        assert_eq!(parse_retry_after(Some("5")), Duration::from_secs(5));
        assert_eq!(parse_retry_after(Some(" 10 ")), Duration::from_secs(10));
        assert_eq!(parse_retry_after(Some("0")), Duration::ZERO);
    }

    #[test]
    fn test_retry_after_defaults() {
        assert_eq!(parse_retry_after(None), DEFAULT_RETRY_AFTER);
        assert_eq!(parse_retry_after(Some("soon")), DEFAULT_RETRY_AFTER);
        assert_eq!(parse_retry_after(Some("-3")), DEFAULT_RETRY_AFTER);
        assert_eq!(
            parse_retry_after(Some("Wed, 21 Oct 2026 07:28:00 GMT")),
            DEFAULT_RETRY_AFTER
        );
    }
}
