use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Runtime settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub export_dir: PathBuf,
    pub strict_dates: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            export_dir: PathBuf::from("."),
            strict_dates: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("PAYROLL_DATABASE_URL"))
            .filter(|url| !url.trim().is_empty());

        let max_connections = match lookup("PAYROLL_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .with_context(|| {
                    format!("PAYROLL_MAX_CONNECTIONS must be a positive integer, got '{raw}'")
                })?,
            None => defaults.max_connections,
        };

        let export_dir = lookup("PAYROLL_EXPORT_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        let strict_dates = match lookup("PAYROLL_STRICT_DATES") {
            Some(raw) => parse_flag(&raw).with_context(|| {
                format!("PAYROLL_STRICT_DATES must be true or false, got '{raw}'")
            })?,
            None => defaults.strict_dates,
        };

        Ok(Self {
            database_url,
            max_connections,
            export_dir,
            strict_dates,
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL (or PAYROLL_DATABASE_URL) must be set")
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let loaded = settings(&[]).unwrap();
        assert_eq!(loaded, Settings::default());
        assert!(loaded.require_database_url().is_err());
    }

    #[test]
    fn prefixed_database_url_is_a_fallback() {
        let loaded = settings(&[("PAYROLL_DATABASE_URL", "postgres://localhost/payroll")]).unwrap();
        assert_eq!(
            loaded.require_database_url().unwrap(),
            "postgres://localhost/payroll"
        );

        let loaded = settings(&[
            ("DATABASE_URL", "postgres://primary/db"),
            ("PAYROLL_DATABASE_URL", "postgres://fallback/db"),
        ])
        .unwrap();
        assert_eq!(loaded.database_url.as_deref(), Some("postgres://primary/db"));
    }

    #[test]
    fn reads_overrides_and_rejects_garbage() {
        let loaded = settings(&[
            ("PAYROLL_MAX_CONNECTIONS", "4"),
            ("PAYROLL_EXPORT_DIR", "/tmp/exports"),
            ("PAYROLL_STRICT_DATES", "TRUE"),
        ])
        .unwrap();
        assert_eq!(loaded.max_connections, 4);
        assert_eq!(loaded.export_dir, PathBuf::from("/tmp/exports"));
        assert!(loaded.strict_dates);

        assert!(settings(&[("PAYROLL_MAX_CONNECTIONS", "0")]).is_err());
        assert!(settings(&[("PAYROLL_STRICT_DATES", "maybe")]).is_err());
    }
}
