// SPDX-FileCopyrightText: 2026 Replyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rate governor: paces post operations and halts the batch on quota
//! exhaustion.
//!
//! The platform budget is a single shared per-window quota, so pacing is a
//! fixed inter-post delay rather than a token bucket. A 429 flips the
//! governor into a halted state for the rest of the batch; the resume time
//! comes from the platform's reset hint when present, otherwise from the
//! next fixed window boundary (the platform resets quotas on clock-aligned
//! windows).

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

pub struct RateGovernor {
    min_delay: Duration,
    window: Duration,
    resume_at: Option<DateTime<Utc>>,
}

impl RateGovernor {
    pub fn new(min_delay: Duration, window: Duration) -> Self {
        Self {
            min_delay,
            window,
            resume_at: None,
        }
    }

    /// Wait out the fixed inter-post delay. One of the loop's two suspension
    /// points.
    pub async fn await_slot(&self) {
        tokio::time::sleep(self.min_delay).await;
    }

    /// Record a quota-exceeded outcome. The governor halts the batch from
    /// here on; there is no automatic un-halt within a batch.
    pub fn record_quota_exceeded(&mut self, reset_hint: Option<DateTime<Utc>>) {
        let resume_at = reset_hint.unwrap_or_else(|| next_window_boundary(Utc::now(), self.window));
        warn!(%resume_at, "platform quota exceeded, halting batch");
        self.resume_at = Some(resume_at);
    }

    pub fn should_halt(&self) -> bool {
        self.resume_at.is_some()
    }

    /// Earliest time posting may resume, once halted.
    pub fn resume_at(&self) -> Option<DateTime<Utc>> {
        self.resume_at
    }
}

/// The next clock-aligned window boundary strictly after `now`.
fn next_window_boundary(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    let window_secs = (window.as_secs() as i64).max(1);
    let next = (now.timestamp() / window_secs + 1) * window_secs;
    DateTime::from_timestamp(next, 0).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const WINDOW: Duration = Duration::from_secs(900);

    #[test]
    fn fresh_governor_does_not_halt() {
        let governor = RateGovernor::new(Duration::from_secs(45), WINDOW);
        assert!(!governor.should_halt());
        assert!(governor.resume_at().is_none());
    }

    #[test]
    fn quota_exceeded_with_hint_uses_the_hint() {
        let mut governor = RateGovernor::new(Duration::from_secs(45), WINDOW);
        let hint = Utc.with_ymd_and_hms(2026, 3, 1, 12, 7, 30).unwrap();
        governor.record_quota_exceeded(Some(hint));
        assert!(governor.should_halt());
        assert_eq!(governor.resume_at(), Some(hint));
    }

    #[test]
    fn quota_exceeded_without_hint_rounds_up_to_window_boundary() {
        let mut governor = RateGovernor::new(Duration::from_secs(45), WINDOW);
        governor.record_quota_exceeded(None);
        let resume_at = governor.resume_at().expect("halted governor has resume time");
        assert!(resume_at > Utc::now());
        assert_eq!(resume_at.timestamp() % 900, 0);
        assert!(resume_at - Utc::now() <= chrono::TimeDelta::seconds(900));
    }

    #[test]
    fn window_boundary_is_strictly_after_now() {
        // Exactly on a boundary rolls to the next one.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 15, 0).unwrap();
        let next = next_window_boundary(now, WINDOW);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 29, 59).unwrap();
        let next = next_window_boundary(now, WINDOW);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn await_slot_sleeps_for_the_configured_delay() {
        let governor = RateGovernor::new(Duration::from_secs(45), WINDOW);
        let before = tokio::time::Instant::now();
        governor.await_slot().await;
        assert_eq!(before.elapsed(), Duration::from_secs(45));
    }
}
