// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and day arithmetic.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whole days elapsed between two instants (truncating, never negative).
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    later.signed_duration_since(earlier).num_days().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn days_between_truncates() {
        let start = Utc::now();
        assert_eq!(days_between(start, start + Duration::hours(23)), 0);
        assert_eq!(days_between(start, start + Duration::hours(25)), 1);
        assert_eq!(days_between(start, start + Duration::days(3)), 3);
    }

    #[test]
    fn days_between_never_negative() {
        let start = Utc::now();
        assert_eq!(days_between(start + Duration::days(2), start), 0);
    }
}
