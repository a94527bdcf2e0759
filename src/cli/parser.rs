//! Command-line interface definition

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;

/// Library catalog REST API server
#[derive(Parser, Debug)]
#[command(name = "libris-rs")]
#[command(about = "Library catalog REST API server")]
#[command(long_about = "
libris-rs serves a library catalog (books, authors, categories, publishers
and reviews) over a JSON REST API with JWT authentication.

EXAMPLES:
    # Start the server with the layered configuration in ./config
    libris-rs serve

    # Bind to all interfaces on port 8080
    libris-rs serve --host 0.0.0.0 --port 8080

    # Run against in-process storage, no PostgreSQL required
    libris-rs serve --in-memory

    # Use a single configuration file
    libris-rs --config /etc/libris/app.toml serve

    # Check configuration without starting the server
    libris-rs serve --dry-run

    # Apply pending migrations, or preview them
    libris-rs migrate
    libris-rs migrate --dry-run

    # Revert the last migration
    libris-rs migrate --rollback 1
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Loads exactly this TOML file instead of the layered `config/`
    /// directory. `LIBRIS_*` environment variables still apply on top.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection (`LIBRIS_APP_ENV`)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    ///
    /// Examples:
    ///   libris-rs serve --host 0.0.0.0 --port 80
    ///   libris-rs serve --in-memory
    ///   libris-rs serve --dry-run
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override, takes precedence over --verbose and --quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,

        /// Use in-process storage seeded with the sample catalog
        ///
        /// Data lives only as long as the process. No database connection
        /// or migration is attempted.
        #[arg(long)]
        in_memory: bool,
    },
    /// Database migration operations
    ///
    /// Examples:
    ///   libris-rs migrate
    ///   libris-rs migrate --dry-run
    ///   libris-rs migrate --rollback 2
    Migrate {
        /// Show pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of most recent migrations to revert (1 to 100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// True when the server should start after configuration is loaded.
    pub fn starts_server(&self) -> bool {
        matches!(
            self.command,
            None | Some(Commands::Serve { dry_run: false, .. })
        )
    }

    pub fn in_memory(&self) -> bool {
        matches!(self.command, Some(Commands::Serve { in_memory: true, .. }))
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_and_version_flags() {
        let err = Cli::try_parse_from(["libris-rs", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["libris-rs", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_subcommand_starts_server() {
        let cli = Cli::try_parse_from(["libris-rs"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.starts_server());
        assert!(!cli.in_memory());
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "libris-rs",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--in-memory",
        ])
        .unwrap();
        assert!(cli.starts_server());
        assert!(cli.in_memory());
        match cli.command {
            Some(Commands::Serve {
                host,
                port,
                dry_run,
                ..
            }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_serve_dry_run_does_not_start_server() {
        let cli = Cli::try_parse_from(["libris-rs", "serve", "--dry-run"]).unwrap();
        assert!(!cli.starts_server());
    }

    #[test]
    fn test_migrate_command() {
        let cli = Cli::try_parse_from(["libris-rs", "migrate", "--rollback", "2"]).unwrap();
        assert!(!cli.starts_server());
        match cli.command {
            Some(Commands::Migrate { dry_run, rollback }) => {
                assert!(!dry_run);
                assert_eq!(rollback, Some(2));
            }
            other => panic!("Expected Migrate command, got {:?}", other),
        }
    }

    #[test]
    fn test_migrate_dry_run_conflicts_with_rollback() {
        let err = Cli::try_parse_from(["libris-rs", "migrate", "--dry-run", "--rollback", "1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["libris-rs", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_environment_aliases() {
        let cli = Cli::try_parse_from(["libris-rs", "--env", "prod"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        assert_eq!(
            crate::config::Environment::from(Environment::Staging),
            crate::config::Environment::Staging
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(Cli::try_parse_from(["libris-rs", "serve", "--port", "0"]).is_err());
    }
}
