//! Client configuration from the environment and command line.

use table_sync::{ConfigError, SyncConfig};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Everything the client needs to follow one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the table server
    pub server_url: String,

    /// Address of the table to follow
    pub table_id: String,

    /// Address this client acts for; `None` watches only
    pub address: Option<String>,

    /// Synchronisation timing
    pub sync: SyncConfig,
}

impl ClientConfig {
    /// Load from `TABLE_SERVER_URL`, `TABLE_ID` and `PLAYER_ADDRESS`, plus
    /// the `TABLE_SYNC_*` timing variables.
    ///
    /// # Errors
    ///
    /// Returns error if the timing configuration is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server_url: std::env::var("TABLE_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            table_id: std::env::var("TABLE_ID").unwrap_or_default(),
            address: std::env::var("PLAYER_ADDRESS")
                .ok()
                .filter(|address| !address.trim().is_empty()),
            sync: SyncConfig::from_env()?,
        })
    }

    /// Apply command-line values over the environment
    pub fn with_overrides(
        mut self,
        server_url: Option<String>,
        table_id: Option<String>,
        address: Option<String>,
    ) -> Self {
        if let Some(server_url) = server_url {
            self.server_url = server_url;
        }
        if let Some(table_id) = table_id {
            self.table_id = table_id;
        }
        if address.is_some() {
            self.address = address;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "TABLE_ID".to_string(),
                reason: "A table address is required (--table or TABLE_ID)".to_string(),
            });
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "TABLE_SERVER_URL".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.server_url),
            });
        }

        self.sync.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: serialised by #[serial]
        unsafe {
            std::env::remove_var("TABLE_SERVER_URL");
            std::env::remove_var("TABLE_ID");
            std::env::remove_var("PLAYER_ADDRESS");
        }
    }

    #[test]
    #[serial]
    fn test_defaults_from_empty_env() {
        clear_env();

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert!(config.table_id.is_empty());
        assert!(config.address.is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_reads_env() {
        clear_env();
        // SAFETY: serialised by #[serial]
        unsafe {
            std::env::set_var("TABLE_SERVER_URL", "https://tables.example");
            std::env::set_var("TABLE_ID", "0xtable");
            std::env::set_var("PLAYER_ADDRESS", "0xAA");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.server_url, "https://tables.example");
        assert_eq!(config.table_id, "0xtable");
        assert_eq!(config.address.as_deref(), Some("0xAA"));
        assert!(config.validate().is_ok());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_address_means_observer() {
        clear_env();
        // SAFETY: serialised by #[serial]
        unsafe {
            std::env::set_var("PLAYER_ADDRESS", "  ");
        }

        assert!(ClientConfig::from_env().unwrap().address.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        // SAFETY: serialised by #[serial]
        unsafe {
            std::env::set_var("TABLE_ID", "0xfrom-env");
            std::env::set_var("PLAYER_ADDRESS", "0xAA");
        }

        let config = ClientConfig::from_env()
            .unwrap()
            .with_overrides(None, Some("0xfrom-cli".to_string()), None);
        assert_eq!(config.table_id, "0xfrom-cli");
        assert_eq!(config.address.as_deref(), Some("0xAA"));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);

        clear_env();
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = ClientConfig {
            server_url: "localhost:8080".to_string(),
            table_id: "0xtable".to_string(),
            address: None,
            sync: SyncConfig::default(),
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TABLE_SERVER_URL"));
    }
}
