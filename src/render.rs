//! Identifier quoting and string escaping shared by the DDL builders.

use itertools::Itertools;

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub fn quote_qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Quote a dotted identity path (`schema.name`) segment by segment.
pub fn quote_path(path: &str) -> String {
    path.split('.').map(|part| quote_ident(part)).join(".")
}
