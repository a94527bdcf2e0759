/// Utility for pulling structured details out of PostgreSQL constraint
/// violation messages.
///
/// PostgreSQL reports violations as free text plus an optional constraint
/// name. Constraint names in this schema follow the default
/// `{table}_{column}_{suffix}` convention, which is what the parser relies on.
pub struct ConstraintParser;

const CONSTRAINT_SUFFIXES: &[&str] = &["_key", "_fkey", "_check", "_pkey"];

impl ConstraintParser {
    /// Splits a constraint name like `users_email_key` into `("users", "email")`.
    ///
    /// When the owning table is known (e.g. parsed from the message), it is
    /// used to split names whose table contains an underscore, such as
    /// `user_roles_role_id_fkey`.
    pub fn parse_constraint_name(
        constraint: &str,
        table_hint: Option<&str>,
    ) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint.strip_suffix(suffix))?;

        if let Some(table) = table_hint
            && let Some(column) = stem
                .strip_prefix(table)
                .and_then(|rest| rest.strip_prefix('_'))
            && !column.is_empty()
        {
            return Some((table.to_string(), column.to_string()));
        }

        let (table, column) = stem.split_once('_')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        Some((table.to_string(), column.to_string()))
    }

    /// Extracts `(field, value)` from a `Key (field)=(value)` fragment.
    pub fn extract_key_value(message: &str) -> Option<(String, String)> {
        let start = message.find("Key (")? + "Key (".len();
        let rest = &message[start..];
        let field_end = rest.find(")=(")?;
        let field = &rest[..field_end];
        let value_part = &rest[field_end + ")=(".len()..];
        let value_end = value_part.find(')')?;
        Some((field.to_string(), value_part[..value_end].to_string()))
    }

    /// Extracts the first quoted name following `marker`, e.g. `column "email"`.
    fn extract_quoted_after(message: &str, marker: &str) -> Option<String> {
        let start = message.find(marker)? + marker.len();
        let rest = message[start..].strip_prefix('"')?;
        let end = rest.find('"')?;
        Some(rest[..end].to_string())
    }

    /// Extracts the column from `null value in column "x"` style messages.
    pub fn extract_column(message: &str) -> Option<String> {
        Self::extract_quoted_after(message, "column ")
    }

    /// Extracts the first table name mentioned in the message.
    pub fn extract_table(message: &str) -> Option<String> {
        Self::extract_quoted_after(message, "table ")
    }

    /// Extracts the referencing table of a restrict violation
    /// (`... violates foreign key constraint "c" on table "books"`).
    pub fn extract_referencing_table(message: &str) -> Option<String> {
        let tail = &message[message.find("constraint ")?..];
        Self::extract_quoted_after(tail, "on table ")
    }

    /// True for violations raised by deleting a row that is still referenced.
    pub fn is_restrict_violation(message: &str) -> bool {
        message.starts_with("update or delete on table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constraint_name_simple() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("users_email_key", None),
            Some(("users".to_string(), "email".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("books_author_id_fkey", None),
            Some(("books".to_string(), "author_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("reviews_rating_check", None),
            Some(("reviews".to_string(), "rating".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_with_table_hint() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("user_roles_role_id_fkey", Some("user_roles")),
            Some(("user_roles".to_string(), "role_id".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_unknown_suffix() {
        assert_eq!(ConstraintParser::parse_constraint_name("idx_books", None), None);
    }

    #[test]
    fn test_extract_key_value() {
        let message = "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(alice@x.com) already exists.";
        assert_eq!(
            ConstraintParser::extract_key_value(message),
            Some(("email".to_string(), "alice@x.com".to_string()))
        );
    }

    #[test]
    fn test_extract_column_and_table() {
        let message = "null value in column \"title\" of relation \"books\" violates not-null constraint";
        assert_eq!(ConstraintParser::extract_column(message), Some("title".to_string()));

        let message = "insert or update on table \"books\" violates foreign key constraint \"books_author_id_fkey\"";
        assert_eq!(ConstraintParser::extract_table(message), Some("books".to_string()));
    }

    #[test]
    fn test_restrict_violation_detection() {
        let message = "update or delete on table \"authors\" violates foreign key constraint \"books_author_id_fkey\" on table \"books\"";
        assert!(ConstraintParser::is_restrict_violation(message));
        assert_eq!(ConstraintParser::extract_table(message), Some("authors".to_string()));
        assert_eq!(
            ConstraintParser::extract_referencing_table(message),
            Some("books".to_string())
        );

        let insert = "insert or update on table \"books\" violates foreign key constraint \"books_author_id_fkey\"";
        assert!(!ConstraintParser::is_restrict_violation(insert));
    }
}
