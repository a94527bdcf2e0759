//! `serve --dry-run`: report the effective configuration and exit.

use crate::config::Settings;
use crate::error::AppResult;

pub struct ServeCommandHandler {
    config: Settings,
    in_memory: bool,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, in_memory: bool) -> Self {
        Self { config, in_memory }
    }

    /// Validates the configuration and prints a summary. Starting the
    /// server itself is left to the caller.
    pub fn execute(&self, dry_run: bool) -> AppResult<()> {
        self.config.validate()?;
        if dry_run {
            println!("{}", self.summary());
        }
        Ok(())
    }

    fn summary(&self) -> String {
        let storage = if self.in_memory {
            "in-memory".to_string()
        } else {
            format!(
                "postgres (pool {}..{}, auto_migrate={})",
                self.config.database.min_connections,
                self.config.database.max_connections,
                self.config.database.auto_migrate
            )
        };
        let cors = match self.config.server.cors_origins.as_slice() {
            [] => "same-origin".to_string(),
            origins => origins.join(", "),
        };

        format!(
            "Configuration is valid\n  \
             listen:   {}\n  \
             storage:  {}\n  \
             cors:     {}\n  \
             tokens:   access {} min, refresh {} h\n  \
             log:      {}",
            self.config.server.address(),
            storage,
            cors,
            self.config.jwt.access_token_expiration_minutes,
            self.config.jwt.refresh_token_expiration_hours,
            self.config.logger.level,
        )
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;

    #[test]
    fn test_dry_run_with_valid_config() {
        let handler = ServeCommandHandler::new(valid_settings(), false);
        assert!(handler.execute(true).is_ok());
        assert_eq!(handler.config(), &valid_settings());
    }

    #[test]
    fn test_dry_run_rejects_invalid_config() {
        let mut config = valid_settings();
        config.server.port = 0;
        assert!(ServeCommandHandler::new(config, false).execute(true).is_err());
    }

    #[test]
    fn test_summary_describes_storage_and_cors() {
        let mut config = valid_settings();
        config.server.cors_origins = vec!["https://a.example".to_string()];

        let summary = ServeCommandHandler::new(config.clone(), true).summary();
        assert!(summary.contains("127.0.0.1:3000"));
        assert!(summary.contains("in-memory"));
        assert!(summary.contains("https://a.example"));

        let summary = ServeCommandHandler::new(valid_settings(), false).summary();
        assert!(summary.contains("postgres"));
        assert!(summary.contains("same-origin"));
    }
}
