use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{escape_string, quote_qualified};

/// An enumerated type. PostgreSQL cannot remove or reorder enum elements
/// in place, so any change to `elements` is migrated by recreating the
/// type; the columns referencing it are coerced through text around the
/// recreation (see the enum reconciliation in the diff layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub schema: String,
    pub name: String,
    pub elements: Vec<String>,
}

impl SchemaObject for EnumType {
    fn identity(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Enum
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        let elements = self.elements.iter().map(|e| escape_string(e)).join(", ");
        format!(
            "CREATE TYPE {} AS ENUM ({});",
            quote_qualified(&self.schema, &self.name),
            elements
        )
    }

    fn drop_statement(&self) -> String {
        format!("DROP TYPE {};", quote_qualified(&self.schema, &self.name))
    }
}
