use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{escape_string, quote_qualified};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collation {
    pub schema: String,
    pub name: String,
    /// `icu` or `libc`; rendered verbatim.
    pub provider: String,
    pub locale: String,
}

impl SchemaObject for Collation {
    fn identity(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Collation
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!(
            "CREATE COLLATION {} (provider = {}, locale = {});",
            quote_qualified(&self.schema, &self.name),
            self.provider,
            escape_string(&self.locale)
        )
    }

    fn drop_statement(&self) -> String {
        format!(
            "DROP COLLATION {};",
            quote_qualified(&self.schema, &self.name)
        )
    }
}
