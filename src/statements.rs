//! The ordered statement buffer produced by the diff engine.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::MigrationError;

/// Matches `drop` followed by whitespace, anywhere in the statement.
///
/// This is a plain case-insensitive substring scan, so an identifier ending
/// in `drop` followed by a space (e.g. `comment on column raindrop is ...`)
/// is also flagged.
static DROP_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)drop\s+").expect("drop pattern is valid"));

/// Whether a statement looks destructive to the safety scan.
pub fn check_for_drop(statement: &str) -> bool {
    DROP_STATEMENT.is_match(statement)
}

/// An append-only sequence of DDL statements with a safety flag.
///
/// Statements render joined by blank lines with a trailing blank line; an
/// empty buffer renders as the empty string. While `safe` is set, rendering
/// refuses to produce destructive output.
#[derive(Debug, Clone, PartialEq)]
pub struct Statements {
    items: Vec<String>,
    pub safe: bool,
}

impl Default for Statements {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            safe: true,
        }
    }
}

impl Statements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: impl Into<String>) {
        self.items.push(statement.into());
    }

    /// Append another buffer, preserving order. The safety flag of `self`
    /// is kept.
    pub fn extend(&mut self, other: Statements) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    /// Render the buffer as a migration script.
    pub fn sql(&self) -> Result<String, MigrationError> {
        if self.safe {
            let destructive: Vec<String> = self
                .items
                .iter()
                .filter(|s| check_for_drop(s))
                .cloned()
                .collect();
            if !destructive.is_empty() {
                return Err(MigrationError::UnsafeChange {
                    statements: destructive,
                });
            }
        }

        if self.items.is_empty() {
            return Ok(String::new());
        }

        Ok(format!("{}\n\n", self.items.join("\n\n")))
    }
}

impl From<Vec<String>> for Statements {
    fn from(items: Vec<String>) -> Self {
        Self { items, safe: true }
    }
}

impl<'a> IntoIterator for &'a Statements {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DROP TABLE \"t\";", true)]
    #[case("drop  index \"i\";", true)]
    #[case("ALTER TABLE \"t\" DROP COLUMN \"c\";", true)]
    #[case("SELECT 1;", false)]
    #[case("CREATE TABLE \"t\" (\"id\" integer);", false)]
    // Known false positive of the substring scan.
    #[case("COMMENT ON COLUMN t.raindrop IS 'x';", true)]
    #[case("CREATE INDEX raindrops ON t (c);", false)]
    fn test_check_for_drop(#[case] statement: &str, #[case] expected: bool) {
        assert_eq!(check_for_drop(statement), expected);
    }

    #[test]
    fn test_empty_renders_as_empty_string() {
        assert_eq!(Statements::new().sql().unwrap(), "");
    }

    #[test]
    fn test_statements_joined_by_blank_lines() {
        let mut statements = Statements::new();
        statements.push("CREATE SCHEMA \"app\";");
        statements.push("CREATE SEQUENCE \"app\".\"seq\";");
        assert_eq!(
            statements.sql().unwrap(),
            "CREATE SCHEMA \"app\";\n\nCREATE SEQUENCE \"app\".\"seq\";\n\n"
        );
    }

    #[test]
    fn test_safety_refuses_destructive_output() {
        let mut statements = Statements::new();
        statements.push("DROP TABLE \"t\";");

        let err = statements.sql().unwrap_err();
        match err {
            MigrationError::UnsafeChange { statements } => {
                assert_eq!(statements, vec!["DROP TABLE \"t\";".to_string()]);
            }
            other => panic!("expected UnsafeChange, got {other:?}"),
        }

        statements.safe = false;
        assert_eq!(statements.sql().unwrap(), "DROP TABLE \"t\";\n\n");
    }

    #[test]
    fn test_extend_preserves_order_and_safety() {
        let mut first = Statements::new();
        first.safe = false;
        first.push("DROP VIEW \"v\";");

        let mut second = Statements::new();
        second.push("CREATE VIEW \"v\" AS SELECT 1;");

        first.extend(second);
        assert_eq!(first.len(), 2);
        assert!(!first.safe);
        assert_eq!(
            first.iter().next().map(String::as_str),
            Some("DROP VIEW \"v\";")
        );
    }
}
