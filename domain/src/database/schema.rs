//! Cached database schema

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A column (or document field) descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            primary_key: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}

/// Mapping from table/collection name to its column descriptors.
///
/// Ordered by table name so prompts and displays are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCache {
    tables: BTreeMap<String, Vec<ColumnDescriptor>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        self.insert_table(name, columns);
        self
    }

    pub fn insert_table(&mut self, name: impl Into<String>, columns: Vec<ColumnDescriptor>) {
        self.tables.insert(name.into(), columns);
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn columns(&self, table: &str) -> Option<&[ColumnDescriptor]> {
        self.tables.get(table).map(Vec::as_slice)
    }

    /// Case-insensitive table lookup
    pub fn find_table(&self, name: &str) -> Option<&str> {
        self.tables
            .keys()
            .find(|t| t.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&str, &[ColumnDescriptor])> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Compact one-line-per-table description used in prompts.
    ///
    /// ```text
    /// users(id INTEGER PK, name TEXT NOT NULL, email TEXT)
    /// ```
    pub fn describe(&self) -> String {
        if self.tables.is_empty() {
            return "(no tables)".to_string();
        }
        self.tables
            .iter()
            .map(|(table, columns)| {
                let cols = columns
                    .iter()
                    .map(|c| {
                        let mut s = format!("{} {}", c.name, c.data_type);
                        if c.primary_key {
                            s.push_str(" PK");
                        } else if !c.nullable {
                            s.push_str(" NOT NULL");
                        }
                        s
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}({})", table, cols)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
