// src/models/mod.rs

pub mod course;
pub mod quiz_result;
pub mod user;

use chrono::{DateTime, SubsecRound, Utc};

/// Postgres `TIMESTAMPTZ` keeps microseconds; truncating up front keeps stored and
/// returned documents identical.
pub fn timestamp(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

/// Current time at storage precision.
pub fn now() -> DateTime<Utc> {
    timestamp(Utc::now())
}

/// Generates a fresh document identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn timestamps_are_truncated_to_microseconds() {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        assert_eq!(timestamp(at).nanosecond(), 123_456_000);
        assert_eq!(now().nanosecond() % 1_000, 0);
    }
}
