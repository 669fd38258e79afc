use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{quote_ident, quote_qualified};

/// A trigger. `definition` is the full `CREATE TRIGGER ...` statement as
/// stored by the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub definition: String,
}

impl SchemaObject for Trigger {
    fn identity(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Trigger
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!("{};", self.definition.trim_end().trim_end_matches(';'))
    }

    fn drop_statement(&self) -> String {
        format!(
            "DROP TRIGGER {} ON {};",
            quote_ident(&self.name),
            quote_qualified(&self.schema, &self.table)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_statements() {
        let trigger = Trigger {
            schema: "public".to_string(),
            table: "users".to_string(),
            name: "audit".to_string(),
            definition:
                "CREATE TRIGGER audit AFTER UPDATE ON public.users FOR EACH ROW EXECUTE FUNCTION public.log_change()"
                    .to_string(),
        };
        assert_eq!(trigger.identity(), "public.users.audit");
        assert_eq!(
            trigger.create_statement(),
            "CREATE TRIGGER audit AFTER UPDATE ON public.users FOR EACH ROW EXECUTE FUNCTION public.log_change();"
        );
        assert_eq!(
            trigger.drop_statement(),
            "DROP TRIGGER \"audit\" ON \"public\".\"users\";"
        );
    }
}
