use chrono::DateTime;
use chrono::Utc;

/// Source of the current instant for token issuance and expiry checks.
///
/// Issuer and validator never call `Utc::now()` directly so that expiry
/// can be exercised deterministically.
pub trait TimeProvider: Send + Sync {
    /// Current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Current Unix timestamp in seconds.
    fn unix_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall-clock time provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time provider pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeProvider(pub DateTime<Utc>);

impl FixedTimeProvider {
    /// Pin the clock to a Unix timestamp in seconds.
    ///
    /// Out-of-range timestamps fall back to the Unix epoch.
    pub fn at(timestamp: i64) -> Self {
        Self(DateTime::from_timestamp(timestamp, 0).unwrap_or_default())
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_provider_returns_pinned_instant() {
        let clock = FixedTimeProvider::at(1_700_000_000);
        assert_eq!(clock.unix_timestamp(), 1_700_000_000);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_provider_tracks_wall_clock() {
        let before = Utc::now().timestamp();
        let now = SystemTimeProvider.unix_timestamp();
        assert!(now >= before);
    }
}
