//! Server configuration from environment.

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub bind_addr: IpAddr,
    pub database_path: String,
    pub database_max_connections: u32,
    /// Directory holding the browser front end
    pub static_dir: PathBuf,
    pub cors_permissive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            database_path: "data/routes.db".to_string(),
            database_max_connections: 5,
            static_dir: PathBuf::from("frontend"),
            cors_permissive: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("ROUTEBOOK_PORT")
                .or_else(|_| env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.server_port),
            bind_addr: env::var("ROUTEBOOK_BIND_ADDR")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bind_addr),
            database_path: env::var("ROUTEBOOK_DATABASE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.database_path),
            database_max_connections: env::var("ROUTEBOOK_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.database_max_connections),
            static_dir: env::var("ROUTEBOOK_STATIC_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            cors_permissive: env_flag("ROUTEBOOK_CORS_PERMISSIVE").unwrap_or(defaults.cors_permissive),
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("OFF"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_path, "data/routes.db");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.static_dir, PathBuf::from("frontend"));
        assert!(config.cors_permissive);
    }
}
