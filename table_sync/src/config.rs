//! Synchronisation timing and table configuration.

use crate::errors::ConfigError;
use std::time::Duration;

/// Default table variant reported when a snapshot does not declare one
pub const DEFAULT_TABLE_TYPE: &str = "No Limit Hold'em";

/// Default number of seats; also the dealer sentinel value the server uses
pub const DEFAULT_TABLE_SIZE: u8 = 9;

/// Timing and table settings for one table session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// How often the poller wakes up
    pub poll_interval: Duration,

    /// Minimum time between two published snapshots
    pub publish_debounce: Duration,

    /// How long a seat cache entry stays fresh
    pub seat_ttl: Duration,

    /// How often the nonce is refreshed while an identity is known
    pub nonce_refresh_interval: Duration,

    /// Delay between an action submission and the follow-up nonce refresh
    pub post_action_nonce_delay: Duration,

    /// Countdown budget reported for the seat next to act
    pub turn_budget: Duration,

    /// Number of seats at the table
    pub table_size: u8,

    /// Table type used when the snapshot has none
    pub default_table_type: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            publish_debounce: Duration::from_secs(20),
            seat_ttl: Duration::from_secs(30),
            nonce_refresh_interval: Duration::from_secs(15),
            post_action_nonce_delay: Duration::from_secs(1),
            turn_budget: Duration::from_secs(30),
            table_size: DEFAULT_TABLE_SIZE,
            default_table_type: DEFAULT_TABLE_TYPE.to_string(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from `TABLE_SYNC_*` environment variables,
    /// falling back to the defaults for anything unset or unparsable.
    ///
    /// # Errors
    ///
    /// Returns error if a parsed value fails validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            poll_interval: millis_env_or("TABLE_SYNC_POLL_INTERVAL_MS", defaults.poll_interval),
            publish_debounce: millis_env_or(
                "TABLE_SYNC_PUBLISH_DEBOUNCE_MS",
                defaults.publish_debounce,
            ),
            seat_ttl: millis_env_or("TABLE_SYNC_SEAT_TTL_MS", defaults.seat_ttl),
            nonce_refresh_interval: millis_env_or(
                "TABLE_SYNC_NONCE_INTERVAL_MS",
                defaults.nonce_refresh_interval,
            ),
            post_action_nonce_delay: millis_env_or(
                "TABLE_SYNC_POST_ACTION_NONCE_DELAY_MS",
                defaults.post_action_nonce_delay,
            ),
            turn_budget: millis_env_or("TABLE_SYNC_TURN_BUDGET_MS", defaults.turn_budget),
            table_size: parse_env_or("TABLE_SYNC_TABLE_SIZE", defaults.table_size),
            default_table_type: std::env::var("TABLE_SYNC_DEFAULT_TABLE_TYPE")
                .unwrap_or(defaults.default_table_type),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("TABLE_SYNC_POLL_INTERVAL_MS", self.poll_interval),
            ("TABLE_SYNC_SEAT_TTL_MS", self.seat_ttl),
            ("TABLE_SYNC_NONCE_INTERVAL_MS", self.nonce_refresh_interval),
        ];
        for (var, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must be greater than zero".to_string(),
                });
            }
        }

        if !(2..=23).contains(&self.table_size) {
            return Err(ConfigError::Invalid {
                var: "TABLE_SYNC_TABLE_SIZE".to_string(),
                reason: "Must be between 2 and 23".to_string(),
            });
        }

        Ok(())
    }
}

fn millis_env_or(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_timings() {
        let config = SyncConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.publish_debounce, Duration::from_secs(20));
        assert_eq!(config.seat_ttl, Duration::from_secs(30));
        assert_eq!(config.nonce_refresh_interval, Duration::from_secs(15));
        assert_eq!(config.post_action_nonce_delay, Duration::from_secs(1));
        assert_eq!(config.table_size, 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_poll_interval() {
        let config = SyncConfig {
            poll_interval: Duration::ZERO,
            ..SyncConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TABLE_SYNC_POLL_INTERVAL_MS"));
    }

    #[test]
    fn test_validation_rejects_tiny_table() {
        let config = SyncConfig {
            table_size: 1,
            ..SyncConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_zero_debounce_delay_and_budget_are_accepted() {
        let config = SyncConfig {
            publish_debounce: Duration::ZERO,
            post_action_nonce_delay: Duration::ZERO,
            turn_budget: Duration::ZERO,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_seat_ttl_and_nonce_interval() {
        let config = SyncConfig {
            seat_ttl: Duration::ZERO,
            ..SyncConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TABLE_SYNC_SEAT_TTL_MS"));

        let config = SyncConfig {
            nonce_refresh_interval: Duration::ZERO,
            ..SyncConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TABLE_SYNC_NONCE_INTERVAL_MS"));
    }

    #[test]
    fn test_validation_rejects_oversized_table() {
        let config = SyncConfig {
            table_size: 24,
            ..SyncConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        // SAFETY: serialised with the other environment tests
        unsafe {
            std::env::set_var("TABLE_SYNC_POLL_INTERVAL_MS", "2500");
            std::env::set_var("TABLE_SYNC_TABLE_SIZE", "6");
        }

        let config = SyncConfig::from_env().unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(2500));
        assert_eq!(config.table_size, 6);
        assert_eq!(config.seat_ttl, Duration::from_secs(30));

        unsafe {
            std::env::remove_var("TABLE_SYNC_POLL_INTERVAL_MS");
            std::env::remove_var("TABLE_SYNC_TABLE_SIZE");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_garbage() {
        unsafe {
            std::env::set_var("TABLE_SYNC_SEAT_TTL_MS", "soon");
        }

        let config = SyncConfig::from_env().unwrap();
        assert_eq!(config.seat_ttl, Duration::from_secs(30));

        unsafe {
            std::env::remove_var("TABLE_SYNC_SEAT_TTL_MS");
        }
    }
}
