//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Checks if this timestamp is after another.
    pub fn is_after(&self, other: &Timestamp) -> bool {
        self.0 > other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Returns the elapsed wall time since `earlier`, saturating at zero.
    pub fn elapsed_since(&self, earlier: &Timestamp) -> std::time::Duration {
        self.duration_since(earlier)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Creates a new timestamp by adding a std duration.
    ///
    /// Saturates at the latest representable instant.
    pub fn plus(&self, duration: std::time::Duration) -> Self {
        let shifted = Duration::from_std(duration)
            .ok()
            .and_then(|delta| self.0.checked_add_signed(delta));
        Self(shifted.unwrap_or(DateTime::<Utc>::MAX_UTC))
    }

    /// Creates a new timestamp by subtracting a std duration.
    ///
    /// Saturates at the earliest representable instant.
    pub fn minus(&self, duration: std::time::Duration) -> Self {
        let shifted = Duration::from_std(duration)
            .ok()
            .and_then(|delta| self.0.checked_sub_signed(delta));
        Self(shifted.unwrap_or(DateTime::<Utc>::MIN_UTC))
    }

    /// Creates a new timestamp by adding the specified number of seconds.
    pub fn plus_secs(&self, secs: u64) -> Self {
        self.plus(std::time::Duration::from_secs(secs))
    }

    /// Creates a new timestamp by adding the specified number of days.
    ///
    /// Negative values subtract days.
    pub fn add_days(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Hour of day (0-23, UTC).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Creates a timestamp from Unix seconds.
    pub fn from_unix_secs(secs: u64) -> Self {
        Self(
            Utc.timestamp_opt(secs as i64, 0)
                .single()
                .unwrap_or_default(),
        )
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> u64 {
        self.0.timestamp().max(0) as u64
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_ordering_helpers_agree() {
        let ts1 = Timestamp::from_unix_secs(1_000);
        let ts2 = Timestamp::from_unix_secs(2_000);

        assert!(ts1.is_before(&ts2));
        assert!(ts2.is_after(&ts1));
        assert!(ts1 < ts2);
    }

    #[test]
    fn elapsed_since_saturates_at_zero() {
        let earlier = Timestamp::from_unix_secs(1_000);
        let later = Timestamp::from_unix_secs(1_060);

        assert_eq!(
            later.elapsed_since(&earlier),
            std::time::Duration::from_secs(60)
        );
        assert_eq!(earlier.elapsed_since(&later), std::time::Duration::ZERO);
    }

    #[test]
    fn plus_and_minus_are_inverse() {
        let ts = Timestamp::from_unix_secs(10_000);
        let d = std::time::Duration::from_secs(90);

        assert_eq!(ts.plus(d).minus(d), ts);
        assert_eq!(ts.plus(d).as_unix_secs(), 10_090);
    }

    #[test]
    fn huge_offsets_saturate_instead_of_overflowing() {
        let ts = Timestamp::from_unix_secs(10_000);
        let huge = std::time::Duration::from_secs(u64::MAX);

        assert_eq!(ts.plus(huge).as_datetime(), &DateTime::<Utc>::MAX_UTC);
        assert_eq!(ts.minus(huge).as_datetime(), &DateTime::<Utc>::MIN_UTC);
        assert!(ts.plus_secs(u64::MAX).is_after(&ts));
    }

    #[test]
    fn hour_reads_utc_hour() {
        // 2024-01-15T23:00:00Z
        let ts = Timestamp::from_unix_secs(1_705_359_600);
        assert_eq!(ts.hour(), 23);
    }

    #[test]
    fn from_unix_secs_roundtrips() {
        let ts = Timestamp::from_unix_secs(1_705_276_800);
        assert_eq!(ts.as_datetime().year(), 2024);
        assert_eq!(ts.as_unix_secs(), 1_705_276_800);
    }

    #[test]
    fn timestamp_deserializes_from_json() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.as_datetime().month(), 1);
    }
}
