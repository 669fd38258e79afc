use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::quote_qualified;

/// An index. `definition` is the full `CREATE [UNIQUE] INDEX ...` statement
/// as stored by the database, with or without a terminating semicolon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub schema: String,
    pub name: String,
    pub table: String,
    pub definition: String,
}

impl SchemaObject for Index {
    fn identity(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Index
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!("{};", self.definition.trim_end().trim_end_matches(';'))
    }

    fn drop_statement(&self) -> String {
        format!("DROP INDEX {};", quote_qualified(&self.schema, &self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_statements() {
        let index = Index {
            schema: "public".to_string(),
            name: "users_email_idx".to_string(),
            table: "users".to_string(),
            definition: "CREATE UNIQUE INDEX users_email_idx ON public.users USING btree (email);"
                .to_string(),
        };
        assert_eq!(
            index.create_statement(),
            "CREATE UNIQUE INDEX users_email_idx ON public.users USING btree (email);"
        );
        assert_eq!(
            index.drop_statement(),
            "DROP INDEX \"public\".\"users_email_idx\";"
        );
    }
}
