use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{quote_ident, quote_qualified};

fn default_object_type() -> String {
    "TABLE".to_string()
}

/// A single granted privilege on a single object for a single grantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Privilege {
    pub schema: String,
    pub name: String,
    /// `TABLE`, `SEQUENCE`, `FUNCTION`, ...; rendered verbatim.
    #[serde(default = "default_object_type")]
    pub object_type: String,
    pub grantee: String,
    /// `SELECT`, `INSERT`, `USAGE`, ...; rendered verbatim.
    pub privilege: String,
}

impl SchemaObject for Privilege {
    fn identity(&self) -> String {
        format!(
            "{}.{}:{}:{}",
            self.schema, self.name, self.grantee, self.privilege
        )
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Privilege
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        format!(
            "GRANT {} ON {} {} TO {};",
            self.privilege,
            self.object_type,
            quote_qualified(&self.schema, &self.name),
            quote_ident(&self.grantee)
        )
    }

    fn drop_statement(&self) -> String {
        format!(
            "REVOKE {} ON {} {} FROM {};",
            self.privilege,
            self.object_type,
            quote_qualified(&self.schema, &self.name),
            quote_ident(&self.grantee)
        )
    }
}
