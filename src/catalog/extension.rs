use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{escape_string, quote_ident};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    pub schema: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl SchemaObject for Extension {
    fn identity(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Extension
    }

    fn equal_to(&self, other: &Self) -> bool {
        self == other
    }

    fn create_statement(&self) -> String {
        let mut sql = format!(
            "CREATE EXTENSION IF NOT EXISTS {} WITH SCHEMA {}",
            quote_ident(&self.name),
            quote_ident(&self.schema)
        );
        if let Some(version) = &self.version {
            sql.push_str(&format!(" VERSION {}", escape_string(version)));
        }
        sql.push(';');
        sql
    }

    fn drop_statement(&self) -> String {
        format!("DROP EXTENSION {};", quote_ident(&self.name))
    }
}
