use std::env;
use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use thiserror::Error;

use crate::domain::money::{default_tax_rate, is_valid_rate};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub rate_oracle_url: Option<String>,
    pub rate_oracle_timeout: Duration,
    pub default_tax_rate: BigDecimal,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let parsed = |name: &'static str| -> Result<Option<(String, u64)>, ConfigError> {
            match lookup(name) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(|n| Some((raw.clone(), n)))
                    .map_err(|_| ConfigError::Invalid { name, value: raw }),
                None => Ok(None),
            }
        };

        let port = match parsed("PORT")? {
            Some((raw, n)) => {
                u16::try_from(n).map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?
            }
            None => 8080,
        };

        let rate_oracle_timeout = parsed("RATE_ORACLE_TIMEOUT_MS")?
            .map(|(_, ms)| Duration::from_millis(ms))
            .unwrap_or(Duration::from_secs(2));

        let default_tax_rate = match lookup("DEFAULT_TAX_RATE") {
            Some(raw) => BigDecimal::from_str(raw.trim())
                .ok()
                .filter(is_valid_rate)
                .ok_or(ConfigError::Invalid {
                    name: "DEFAULT_TAX_RATE",
                    value: raw,
                })?,
            None => default_tax_rate(),
        };

        Ok(Settings {
            database_url: required("DATABASE_URL")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            jwt_secret: required("JWT_SECRET")?,
            rate_oracle_url: lookup("RATE_ORACLE_URL").filter(|v| !v.trim().is_empty()),
            rate_oracle_timeout,
            default_tax_rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    const BASE: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/store"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply() {
        let s = settings(&BASE).unwrap();
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 8080);
        assert_eq!(s.rate_oracle_url, None);
        assert_eq!(s.rate_oracle_timeout, Duration::from_secs(2));
        assert_eq!(s.default_tax_rate, default_tax_rate());
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = BASE.to_vec();
        vars.extend([
            ("PORT", "9000"),
            ("RATE_ORACLE_URL", "http://rates.local"),
            ("RATE_ORACLE_TIMEOUT_MS", "500"),
            ("DEFAULT_TAX_RATE", "0.0725"),
        ]);
        let s = settings(&vars).unwrap();
        assert_eq!(s.port, 9000);
        assert_eq!(s.rate_oracle_url.as_deref(), Some("http://rates.local"));
        assert_eq!(s.rate_oracle_timeout, Duration::from_millis(500));
        assert_eq!(s.default_tax_rate, BigDecimal::from_str("0.0725").unwrap());
    }

    #[test]
    fn missing_required_values_are_reported() {
        assert!(matches!(
            settings(&[("JWT_SECRET", "secret")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        assert!(matches!(
            settings(&[("DATABASE_URL", "postgres://x")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut vars = BASE.to_vec();
        vars.push(("PORT", "70000"));
        assert!(matches!(settings(&vars), Err(ConfigError::Invalid { name: "PORT", .. })));

        let mut vars = BASE.to_vec();
        vars.push(("DEFAULT_TAX_RATE", "1.5"));
        assert!(matches!(
            settings(&vars),
            Err(ConfigError::Invalid {
                name: "DEFAULT_TAX_RATE",
                ..
            })
        ));
    }
}
