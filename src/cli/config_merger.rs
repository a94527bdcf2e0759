//! Applies command-line overrides on top of file and environment configuration
//!
//! Precedence, highest first: subcommand flags, global flags, `LIBRIS_*`
//! variables, configuration files.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the unvalidated base settings selected by `--config` and `--env`.
    ///
    /// Validation is deferred to [`merge_cli_args`](Self::merge_cli_args) so
    /// that flags such as `--port` can repair a value before it is checked.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Returns a validated copy of the base settings with CLI overrides applied.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;
    use clap::Parser;

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(valid_settings()).merge_cli_args(&cli)
    }

    #[test]
    fn test_no_overrides_keeps_base() {
        let merged = merge(&["libris-rs"]).unwrap();
        assert_eq!(merged, valid_settings());
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        assert_eq!(merge(&["libris-rs", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["libris-rs", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_host_and_port() {
        let merged = merge(&["libris-rs", "serve", "--host", "0.0.0.0", "--port", "8080"]).unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 8080);
        assert_eq!(merged.server.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_command_log_level_overrides_global_flag() {
        let merged = merge(&["libris-rs", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_merged_settings_are_validated() {
        let mut base = valid_settings();
        base.jwt.secret = "short".to_string();
        let cli = Cli::try_parse_from(["libris-rs", "serve"]).unwrap();

        match ConfigurationMerger::new(base).merge_cli_args(&cli) {
            Err(ConfigError::ValidationError { field, .. }) => assert_eq!(field, "jwt.secret"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_base_config_is_untouched() {
        let cli = Cli::try_parse_from(["libris-rs", "serve", "--port", "9000"]).unwrap();
        let merger = ConfigurationMerger::new(valid_settings());
        merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merger.config().server.port, 3000);
    }
}
