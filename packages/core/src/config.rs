use std::env;
use std::net::SocketAddr;

use crate::cli::Cli;
use crate::level::Level;
use crate::logger::{Logger, LoggerBuilder};

pub const DEFAULT_ADMIN_ADDR: &str = "127.0.0.1:9090";

/// Settings of the `logkit` binary. The level is only set from
/// `--log-level` through [`Config::merge_cli`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub admin_addr: SocketAddr,
    pub development: bool,
    pub level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let admin_addr = lookup("LOGKIT_ADMIN_ADDR")
            .unwrap_or_else(|| DEFAULT_ADMIN_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|_| "LOGKIT_ADMIN_ADDR must be a socket address like 127.0.0.1:9090")?;

        let development = match lookup("LOGKIT_DEVELOPMENT").as_deref() {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => return Err(format!("Invalid LOGKIT_DEVELOPMENT: {}", other)),
        };

        Ok(Self {
            admin_addr,
            development,
            level: Level::default(),
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn merge_cli(mut self, cli: &Cli) -> Self {
        if let Some(addr) = cli.admin_addr {
            self.admin_addr = addr;
        }
        self.development |= cli.development;
        self.level = cli.log.log_level;
        self
    }

    pub fn logger_builder(&self) -> LoggerBuilder {
        Logger::builder()
            .level(self.level)
            .development(self.development)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Log;
    use clap::Parser;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.admin_addr, DEFAULT_ADMIN_ADDR.parse().unwrap());
        assert!(!config.development);
    }

    #[test]
    fn reads_values_from_environment() {
        let config = Config::from_lookup(lookup(&[
            ("LOGKIT_ADMIN_ADDR", "0.0.0.0:7000"),
            ("LOGKIT_DEVELOPMENT", "true"),
        ]))
        .unwrap();
        assert_eq!(config.admin_addr.port(), 7000);
        assert!(config.development);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("LOGKIT_ADMIN_ADDR", "nowhere")])).is_err());
        let err = Config::from_lookup(lookup(&[("LOGKIT_DEVELOPMENT", "maybe")])).unwrap_err();
        assert_eq!(err, "Invalid LOGKIT_DEVELOPMENT: maybe");
    }

    #[test]
    fn cli_flags_override_environment() {
        let cli = Cli::try_parse_from(["logkit", "--admin-addr", "127.0.0.1:8181", "--development"])
            .unwrap();
        let config = Config::from_lookup(lookup(&[])).unwrap().merge_cli(&cli);
        assert_eq!(config.admin_addr.port(), 8181);
        assert!(config.development);
    }

    #[test]
    fn environment_development_mode_reaches_the_logger() {
        let cli = Cli::try_parse_from(["logkit", "--log-level", "warn"]).unwrap();
        let config = Config::from_lookup(lookup(&[("LOGKIT_DEVELOPMENT", "true")]))
            .unwrap()
            .merge_cli(&cli);

        let logger = config.logger_builder().build();
        assert!(logger.development());
        assert_eq!(logger.atomic_level().level(), Level::Warn);
    }

    #[test]
    fn merged_defaults_build_a_production_info_logger() {
        let cli = Cli::try_parse_from(["logkit"]).unwrap();
        let config = Config::from_lookup(lookup(&[])).unwrap().merge_cli(&cli);

        let logger = config.logger_builder().build();
        assert!(!logger.development());
        assert_eq!(logger.atomic_level().level(), Level::Info);
    }
}
