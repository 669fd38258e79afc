use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{quote_ident, quote_qualified};

pub const PRIMARY_KEY: &str = "PRIMARY KEY";

/// A table constraint. `definition` is the body after `ADD CONSTRAINT name`,
/// e.g. `PRIMARY KEY ("id")` or `FOREIGN KEY ("owner") REFERENCES ...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub constraint_type: String,
    pub definition: String,
}

impl Constraint {
    pub fn is_primary_key(&self) -> bool {
        self.constraint_type == PRIMARY_KEY
    }
}

impl SchemaObject for Constraint {
    fn identity(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Constraint
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {};",
            quote_qualified(&self.schema, &self.table),
            quote_ident(&self.name),
            self.definition
        )
    }

    fn drop_statement(&self) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            quote_qualified(&self.schema, &self.table),
            quote_ident(&self.name)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_statements() {
        let pk = Constraint {
            schema: "public".to_string(),
            table: "users".to_string(),
            name: "users_pkey".to_string(),
            constraint_type: PRIMARY_KEY.to_string(),
            definition: "PRIMARY KEY (\"id\")".to_string(),
        };
        assert!(pk.is_primary_key());
        assert_eq!(pk.identity(), "public.users.users_pkey");
        assert_eq!(
            pk.create_statement(),
            "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"users_pkey\" PRIMARY KEY (\"id\");"
        );
        assert_eq!(
            pk.drop_statement(),
            "ALTER TABLE \"public\".\"users\" DROP CONSTRAINT \"users_pkey\";"
        );
    }
}
