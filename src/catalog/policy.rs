use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{quote_ident, quote_qualified};

fn default_true() -> bool {
    true
}

/// A row-level security policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RlsPolicy {
    pub schema: String,
    pub table: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub permissive: bool,
    /// `ALL`, `SELECT`, `INSERT`, `UPDATE`, or `DELETE`.
    pub commandtype: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub qual: Option<String>,
    #[serde(default)]
    pub withcheck: Option<String>,
}

impl SchemaObject for RlsPolicy {
    fn identity(&self) -> String {
        format!("{}.{}.{}", self.schema, self.table, self.name)
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::RlsPolicy
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        let mut sql = format!(
            "CREATE POLICY {} ON {} AS {} FOR {}",
            quote_ident(&self.name),
            quote_qualified(&self.schema, &self.table),
            if self.permissive {
                "PERMISSIVE"
            } else {
                "RESTRICTIVE"
            },
            self.commandtype
        );
        if !self.roles.is_empty() {
            let roles = self.roles.iter().map(|r| quote_ident(r)).join(", ");
            sql.push_str(&format!(" TO {}", roles));
        }
        if let Some(qual) = &self.qual {
            sql.push_str(&format!(" USING ({})", qual));
        }
        if let Some(check) = &self.withcheck {
            sql.push_str(&format!(" WITH CHECK ({})", check));
        }
        sql.push(';');
        sql
    }

    fn drop_statement(&self) -> String {
        format!(
            "DROP POLICY {} ON {};",
            quote_ident(&self.name),
            quote_qualified(&self.schema, &self.table)
        )
    }
}
