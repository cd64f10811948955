//! Explicit policy switches of the reconciler and the live channel.

use std::time::Duration;

use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What to do with a stream update whose `id` is not in the table.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum UnknownIdPolicy {
    /// Leave the table untouched. New listings only appear after a fresh snapshot.
    #[default]
    RejectUnknown,
    /// Append the record at the end of the table.
    InsertUnknown,
}

/// Reconnect behaviour after the live channel drops.
///
/// Backoff doubles from `initial_backoff` up to `max_backoff`; each delay gets up to
/// `jitter` (a fraction of the delay) added at random.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Whether to reconnect at all.
    pub enabled: bool,
    /// Delay before the first reconnect attempt.
    pub initial_backoff: Duration,
    /// Upper bound of a single delay.
    pub max_backoff: Duration,
    /// Consecutive failed attempts before giving up; `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Random extra delay as a fraction of the base delay, in `[0, 1]`. A non-finite
    /// value disables jitter.
    pub jitter: f64,
}

impl ReconnectPolicy {
    /// Never reconnect; a dropped channel stays closed.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether attempt number `attempt` (1-based) may be made.
    pub fn allows(&self, attempt: u32) -> bool {
        self.enabled && self.max_attempts.is_none_or(|max| attempt <= max)
    }

    /// Base delay before attempt number `attempt` (1-based), without jitter.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exp)
            .min(self.max_backoff)
    }

    /// Delay before attempt number `attempt`, jitter included.
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if !self.jitter.is_finite() {
            return base;
        }
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 {
            return base;
        }
        let extra = rand::rng().random_range(0.0..=jitter);
        base + base.mul_f64(extra)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            max_attempts: Some(10),
            jitter: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_policy_parses_kebab_case() {
        assert_eq!(
            "insert-unknown".parse::<UnknownIdPolicy>().unwrap(),
            UnknownIdPolicy::InsertUnknown
        );
        assert_eq!(
            "Reject-Unknown".parse::<UnknownIdPolicy>().unwrap(),
            UnknownIdPolicy::RejectUnknown
        );
        assert_eq!(UnknownIdPolicy::RejectUnknown.to_string(), "reject-unknown");
        assert_eq!(UnknownIdPolicy::default(), UnknownIdPolicy::RejectUnknown);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = ReconnectPolicy {
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(700),
            jitter: 0.0,
            ..ReconnectPolicy::default()
        };
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
        assert_eq!(policy.delay(4), Duration::from_millis(700));
        assert_eq!(policy.delay(40), Duration::from_millis(700));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let policy = ReconnectPolicy {
            initial_backoff: Duration::from_millis(100),
            jitter: 0.5,
            ..ReconnectPolicy::default()
        };
        for _ in 0..100 {
            let delay = policy.delay(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn non_finite_jitter_falls_back_to_base_delay() {
        for jitter in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let policy = ReconnectPolicy {
                initial_backoff: Duration::from_millis(100),
                jitter,
                ..ReconnectPolicy::default()
            };
            assert_eq!(policy.delay(1), Duration::from_millis(100));
        }
    }

    #[test]
    fn attempt_cap_and_disabled() {
        let capped = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        assert!(capped.allows(1));
        assert!(capped.allows(2));
        assert!(!capped.allows(3));

        let unbounded = ReconnectPolicy {
            max_attempts: None,
            ..ReconnectPolicy::default()
        };
        assert!(unbounded.allows(1_000));

        assert!(!ReconnectPolicy::disabled().allows(1));
    }
}
