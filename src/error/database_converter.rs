use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Constraint violations become client errors (`Duplicate`, `Validation`);
/// everything else becomes `AppError::Database`, which the API layer reports
/// as a generic 500.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let details = info.details().unwrap_or_default();
        let constraint = info.constraint_name();
        let table_hint = info
            .table_name()
            .map(str::to_string)
            .or_else(|| ConstraintParser::extract_table(message));

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                let parsed = constraint
                    .and_then(|c| ConstraintParser::parse_constraint_name(c, table_hint.as_deref()));
                let value = ConstraintParser::extract_key_value(details)
                    .or_else(|| ConstraintParser::extract_key_value(message));
                match (parsed, value) {
                    (Some((entity, field)), Some((_, value))) => AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                    (None, Some((field, value))) => AppError::Duplicate {
                        entity: table_hint.unwrap_or_else(|| "resource".to_string()),
                        field,
                        value,
                    },
                    (Some((entity, field)), None) => AppError::Duplicate {
                        entity,
                        field,
                        value: "duplicate_value".to_string(),
                    },
                    (None, None) => Self::fallback(operation, "Unique constraint violation", message),
                }
            }
            DatabaseErrorKind::NotNullViolation => {
                match info
                    .column_name()
                    .map(str::to_string)
                    .or_else(|| ConstraintParser::extract_column(message))
                {
                    Some(field) => AppError::Validation {
                        field,
                        reason: format!(
                            "Field is required for {}",
                            table_hint.unwrap_or_else(|| "resource".to_string())
                        ),
                    },
                    None => Self::fallback(operation, "Not null constraint violation", message),
                }
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                if ConstraintParser::is_restrict_violation(message) {
                    let entity = table_hint.unwrap_or_else(|| "resource".to_string());
                    let dependents = ConstraintParser::extract_referencing_table(message)
                        .unwrap_or_else(|| "other records".to_string());
                    return AppError::Validation {
                        field: "id".to_string(),
                        reason: format!("{} is still referenced by {}", entity, dependents),
                    };
                }

                let field = constraint
                    .and_then(|c| ConstraintParser::parse_constraint_name(c, table_hint.as_deref()))
                    .map(|(_, field)| field);
                let value = ConstraintParser::extract_key_value(details)
                    .or_else(|| ConstraintParser::extract_key_value(message));
                match (field, value) {
                    (Some(field), Some((_, value))) => AppError::Validation {
                        reason: format!("Invalid reference in {} with value '{}'", field, value),
                        field,
                    },
                    (Some(field), None) | (None, Some((field, _))) => AppError::Validation {
                        reason: format!("Invalid reference in {}", field),
                        field,
                    },
                    (None, None) => {
                        Self::fallback(operation, "Foreign key constraint violation", message)
                    }
                }
            }
            DatabaseErrorKind::CheckViolation => {
                match constraint
                    .and_then(|c| ConstraintParser::parse_constraint_name(c, table_hint.as_deref()))
                {
                    Some((entity, field)) => AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {}", entity),
                    },
                    None => Self::fallback(operation, "Check constraint violation", message),
                }
            }
            _ => Self::fallback(operation, "Database error", message),
        }
    }

    fn fallback(operation: &str, label: &str, message: &str) -> AppError {
        AppError::Database {
            operation: operation.to_string(),
            source: anyhow::Error::msg(format!("{}: {}", label, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
        details: Option<String>,
        constraint_name: Option<String>,
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            self.details.as_deref()
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(
        kind: DatabaseErrorKind,
        message: &str,
        details: Option<&str>,
        constraint: Option<&str>,
    ) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(MockDatabaseErrorInfo {
                message: message.to_string(),
                details: details.map(str::to_string),
                constraint_name: constraint.map(str::to_string),
            }),
        )
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find book");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_convert_unique_violation() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"users_email_key\"",
            Some("Key (email)=(alice@x.com) already exists."),
            Some("users_email_key"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "email");
                assert_eq!(value, "alice@x.com");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_unique_index_violation_on_expression() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"users_username_key\"",
            Some("Key (lower(username::text))=(alice) already exists."),
            Some("users_username_key"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "username");
                assert_eq!(value, "alice");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_foreign_key_violation_on_insert() {
        let error = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "insert or update on table \"books\" violates foreign key constraint \"books_author_id_fkey\"",
            Some("Key (author_id)=(999) is not present in table \"authors\"."),
            Some("books_author_id_fkey"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert book") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "author_id");
                assert!(reason.contains("999"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_restrict_violation_on_delete() {
        let error = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "update or delete on table \"authors\" violates foreign key constraint \"books_author_id_fkey\" on table \"books\"",
            Some("Key (id)=(1) is still referenced from table \"books\"."),
            Some("books_author_id_fkey"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "delete author") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "id");
                assert_eq!(reason, "authors is still referenced by books");
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_check_violation() {
        let error = db_error(
            DatabaseErrorKind::CheckViolation,
            "new row for relation \"reviews\" violates check constraint \"reviews_rating_check\"",
            None,
            Some("reviews_rating_check"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert review") {
            AppError::Validation { field, .. } => assert_eq!(field, "rating"),
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_other_errors_to_database() {
        let result = DatabaseErrorConverter::convert_diesel_error(
            DieselError::RollbackTransaction,
            "save changes",
        );
        match result {
            AppError::Database { operation, .. } => assert_eq!(operation, "save changes"),
            other => panic!("Expected Database error, got: {:?}", other),
        }
    }
}
