use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

pub const CONFIG_PATH_VAR: &str = "GUESTBOOK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "guestbook.env";

const KEY_DATABASE: &str = "DATABASE";
const KEY_SECRET_KEY: &str = "SECRET_KEY";
const KEY_PORT: &str = "PORT";
const KEY_SESSION_TTL_DAYS: &str = "SESSION_TTL_DAYS";
const KNOWN_KEYS: [&str; 4] = [KEY_DATABASE, KEY_SECRET_KEY, KEY_PORT, KEY_SESSION_TTL_DAYS];

const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// Process-wide settings, read once before the listener starts.
#[derive(Clone)]
pub struct AppConfig {
    pub database: PathBuf,
    pub secret_key: String,
    pub port: u16,
    pub session_ttl_days: i64,
}

impl AppConfig {
    /// Reads the config file named by `GUESTBOOK_CONFIG` (or `guestbook.env`),
    /// then lets process environment variables override individual keys.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut values = read_config_file(&path)?;
        for key in KNOWN_KEYS {
            if let Ok(value) = env::var(key) {
                values.insert(key.to_string(), value);
            }
        }

        let config = Self::from_values(&values)?;
        info!(
            config = %path.display(),
            database = %config.database.display(),
            port = config.port,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let database = values
            .get(KEY_DATABASE)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("{KEY_DATABASE} is not configured"))?;

        let secret_key = values
            .get(KEY_SECRET_KEY)
            .cloned()
            .ok_or_else(|| anyhow!("{KEY_SECRET_KEY} is not configured"))?;
        if secret_key.len() < MIN_SECRET_KEY_LEN {
            bail!("{KEY_SECRET_KEY} must be at least {MIN_SECRET_KEY_LEN} bytes long");
        }

        let port = match values.get(KEY_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid {KEY_PORT} value: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let session_ttl_days = match values.get(KEY_SESSION_TTL_DAYS) {
            Some(raw) => {
                let days = raw
                    .trim()
                    .parse::<i64>()
                    .with_context(|| format!("invalid {KEY_SESSION_TTL_DAYS} value: {raw}"))?;
                if days <= 0 {
                    bail!("{KEY_SESSION_TTL_DAYS} must be positive");
                }
                days
            }
            None => DEFAULT_SESSION_TTL_DAYS,
        };

        Ok(Self {
            database,
            secret_key,
            port,
            session_ttl_days,
        })
    }
}

fn read_config_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        warn!(path = %path.display(), "config file not found, using environment only");
        return Ok(HashMap::new());
    }

    dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?
        .map(|item| item.with_context(|| format!("malformed line in {}", path.display())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_for_optional_keys() {
        let config =
            AppConfig::from_values(&values(&[("DATABASE", "/tmp/guestbook.db"), ("SECRET_KEY", SECRET)]))
                .unwrap();
        assert_eq!(config.database, PathBuf::from("/tmp/guestbook.db"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.session_ttl_days, DEFAULT_SESSION_TTL_DAYS);
    }

    #[test]
    fn missing_database_is_rejected() {
        let err = AppConfig::from_values(&values(&[("SECRET_KEY", SECRET)])).err().unwrap();
        assert!(err.to_string().contains("DATABASE"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let result =
            AppConfig::from_values(&values(&[("DATABASE", "g.db"), ("SECRET_KEY", "short")]));
        assert!(result.is_err());
    }

    #[test]
    fn bad_port_is_rejected() {
        let result = AppConfig::from_values(&values(&[
            ("DATABASE", "g.db"),
            ("SECRET_KEY", SECRET),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn reads_dotenv_style_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# guestbook settings").unwrap();
        writeln!(file, "DATABASE=/var/lib/guestbook/entries.db").unwrap();
        writeln!(file, "SECRET_KEY={SECRET}").unwrap();
        writeln!(file, "PORT=5000").unwrap();

        let parsed = read_config_file(file.path()).unwrap();
        let config = AppConfig::from_values(&parsed).unwrap();
        assert_eq!(config.database, PathBuf::from("/var/lib/guestbook/entries.db"));
        assert_eq!(config.port, 5000);
    }

    #[test]
    fn missing_file_yields_no_values() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = read_config_file(&dir.path().join("absent.env")).unwrap();
        assert!(parsed.is_empty());
    }
}
