use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::quote_ident;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
}

impl SchemaObject for Schema {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Schema
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!("CREATE SCHEMA {};", quote_ident(&self.name))
    }

    fn drop_statement(&self) -> String {
        format!("DROP SCHEMA {};", quote_ident(&self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements() {
        let schema = Schema {
            name: "app".to_string(),
        };
        assert_eq!(schema.identity(), "app");
        assert_eq!(schema.create_statement(), "CREATE SCHEMA \"app\";");
        assert_eq!(schema.drop_statement(), "DROP SCHEMA \"app\";");
    }
}
