use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::quote_qualified;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
}

impl SchemaObject for Sequence {
    fn identity(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Sequence
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!(
            "CREATE SEQUENCE {};",
            quote_qualified(&self.schema, &self.name)
        )
    }

    fn drop_statement(&self) -> String {
        format!(
            "DROP SEQUENCE {};",
            quote_qualified(&self.schema, &self.name)
        )
    }
}
