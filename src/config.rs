use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub static_dir: String,
    pub seed_database: bool,
}

impl Config {
    pub fn load() -> Self {
        Self {
            database_url: try_load("DATABASE_URL", "sqlite://fyyur.db"),
            port: try_load("PORT", "3000"),
            max_connections: try_load("DB_MAX_CONNECTIONS", "5"),
            static_dir: try_load("STATIC_DIR", "static"),
            seed_database: try_load("SEED_DATABASE", "true"),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    parse_or_default(key, var(key), default).expect("Environment misconfigured!")
}

fn parse_or_default<T: FromStr>(key: &str, value: Option<String>, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    let raw = value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value {raw:?}: {e}");
        format!("invalid {key}: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_falls_back_to_default() {
        let port: u16 = parse_or_default("PORT", None, "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn present_value_wins_over_default() {
        let seed: bool = parse_or_default("SEED_DATABASE", Some(" false ".into()), "true").unwrap();
        assert!(!seed);
    }

    #[test]
    fn unparsable_value_is_an_error() {
        let port: Result<u16, _> = parse_or_default("PORT", Some("eighty".into()), "3000");
        assert!(port.is_err());
    }
}
