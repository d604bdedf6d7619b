//! Runtime configuration
//!
//! Everything is read from environment variables with sensible defaults, so
//! the server starts with no configuration at all.

use std::path::PathBuf;

pub const DATABASE_PATH_VAR: &str = "NUTRILOG_DATABASE_PATH";
pub const USER_ID_VAR: &str = "NUTRILOG_USER_ID";
pub const DEMO_SEED_VAR: &str = "NUTRILOG_DEMO_SEED";

const DEFAULT_USER_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: PathBuf,
    /// User for tool calls that omit one
    pub default_user_id: i64,
    /// Seed for reproducible demo data; entropy-seeded when unset
    pub demo_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Unparseable values fall back
    /// to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let default_user_id = lookup(USER_ID_VAR)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(DEFAULT_USER_ID);

        let demo_seed = lookup(DEMO_SEED_VAR).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            database_path,
            default_user_id,
            demo_seed,
        }
    }
}

/// `data/nutrilog.db` under the project root, found from the executable path
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(root) = path.parent().and_then(|p| p.parent()) {
            path = root.to_path_buf();
        }
    }

    path.push("data");
    path.push("nutrilog.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.default_user_id, 1);
        assert_eq!(config.demo_seed, None);
        assert!(config.database_path.ends_with("data/nutrilog.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (DATABASE_PATH_VAR, "/tmp/meals.db"),
            (USER_ID_VAR, "42"),
            (DEMO_SEED_VAR, "7"),
        ]);
        assert_eq!(config.database_path, PathBuf::from("/tmp/meals.db"));
        assert_eq!(config.default_user_id, 42);
        assert_eq!(config.demo_seed, Some(7));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config_from(&[(USER_ID_VAR, "abc"), (DEMO_SEED_VAR, "-1")]);
        assert_eq!(config.default_user_id, 1);
        assert_eq!(config.demo_seed, None);
    }
}
