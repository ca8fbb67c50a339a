// SPDX-License-Identifier: MIT

//! Expiry classification.
//!
//! Pure function over (expiry, now); everything that branches on service
//! freshness goes through here so the renewal workflow and the proactive
//! scanner cannot disagree.

use chrono::{DateTime, Utc};

/// Classification of a service's expiry state at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// Expiry is strictly in the past; carries whole days elapsed.
    Expired { days_ago: i64 },
    /// Within the renewal threshold; carries whole days remaining.
    /// `expiry == now` lands here with 0 days left.
    Expiring { days_left: i64 },
    /// Comfortably in the future; carries whole days remaining.
    Valid { days_left: i64 },
}

impl ExpiryStatus {
    /// Whether the service may be renewed right now.
    pub fn is_renewable(self) -> bool {
        !matches!(self, ExpiryStatus::Valid { .. })
    }

    /// Signed whole days until expiry (negative once expired). This is the
    /// value recorded in reminder metadata.
    pub fn days_left(self) -> i64 {
        match self {
            ExpiryStatus::Expired { days_ago } => -days_ago,
            ExpiryStatus::Expiring { days_left } | ExpiryStatus::Valid { days_left } => days_left,
        }
    }
}

/// Classify a service expiry against `now`.
///
/// Day counts are truncated whole days, matching how the rest of the system
/// talks about "days left": a service expiring in 36 hours is "expiring in
/// 1 day".
pub fn classify(expiry: DateTime<Utc>, now: DateTime<Utc>, threshold_days: i64) -> ExpiryStatus {
    let days_left = (expiry - now).num_days();

    if expiry < now {
        ExpiryStatus::Expired { days_ago: -days_left }
    } else if days_left <= threshold_days {
        ExpiryStatus::Expiring { days_left }
    } else {
        ExpiryStatus::Valid { days_left }
    }
}

/// Human-readable status line used in LLM prompt context and logs.
pub fn describe(label: &str, expiry: DateTime<Utc>, status: ExpiryStatus) -> String {
    let date = expiry.date_naive();
    match status {
        ExpiryStatus::Expired { days_ago } => {
            format!("{label}: EXPIRED {days_ago} day(s) ago (on {date}).")
        }
        ExpiryStatus::Expiring { days_left } => {
            format!("{label}: EXPIRING in {days_left} day(s), on {date}.")
        }
        ExpiryStatus::Valid { days_left } => {
            format!("{label}: VALID, expires in {days_left} day(s) on {date}.")
        }
    }
}
