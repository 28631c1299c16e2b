/// Database connection configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Pool size (default: `20`).
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection (default: `30`).
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl DbConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default     |
    /// |---------------------------|-------------|
    /// | `DATABASE_URL`            | *(required)*|
    /// | `DB_MAX_CONNECTIONS`      | `20`        |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `30`        |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            max_connections: parse_var("DB_MAX_CONNECTIONS", 20, "u32")?,
            acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", 30, "u64")?,
        })
    }
}

/// Read an optional numeric environment variable, falling back to `default`.
pub fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u32 = parse_var("MLKIDS_TEST_UNSET_VARIABLE", 7, "u32").unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::Missing("DATABASE_URL").to_string(),
            "DATABASE_URL must be set"
        );
        let err = ConfigError::Invalid {
            name: "DB_MAX_CONNECTIONS",
            expected: "u32",
            value: "lots".into(),
        };
        assert_eq!(err.to_string(), "DB_MAX_CONNECTIONS must be a valid u32, got 'lots'");
    }
}
