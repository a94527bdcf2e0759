//! `migrate`: apply, preview or revert the embedded migrations.

use crate::config::Settings;
use crate::db;
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Fails on an invalid database section, an unreachable database or a
    /// migration that cannot be applied or reverted.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;
        let url = self.config.database.url.as_str();

        match (dry_run, rollback) {
            (true, _) => {
                let pending = db::pending_migrations(url).await?;
                if pending.is_empty() {
                    println!("No pending migrations; database is up to date");
                } else {
                    println!("{} pending migration(s):", pending.len());
                    for name in &pending {
                        println!("  - {}", name);
                    }
                }
            }
            (false, Some(steps)) => {
                let reverted = db::revert_migrations(url, steps).await?;
                println!("Reverted {} migration(s):", reverted.len());
                for version in &reverted {
                    println!("  - {}", version);
                }
            }
            (false, None) => {
                let applied = db::run_pending_migrations(url).await?;
                if applied.is_empty() {
                    println!("No migrations to apply; database is up to date");
                } else {
                    println!("Applied {} migration(s):", applied.len());
                    for version in &applied {
                        println!("  - {}", version);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::tests::valid_settings;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_zero_rollback_steps() {
        let handler = MigrateCommandHandler::new(valid_settings());

        match handler.execute(false, Some(0)).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "rollback_steps"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_database_url_fails_before_connecting() {
        let mut config = valid_settings();
        config.database.url = "mysql://localhost/libris".to_string();
        let handler = MigrateCommandHandler::new(config);

        match handler.execute(true, None).await {
            Err(AppError::Configuration { key, .. }) => assert_eq!(key, "database.url"),
            other => panic!("Expected Configuration error, got {:?}", other),
        }
        assert_eq!(handler.config().database.url, "mysql://localhost/libris");
    }
}
