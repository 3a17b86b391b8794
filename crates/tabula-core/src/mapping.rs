//! Entity column mapping
//!
//! Associates column keys with the entity properties they were resolved from.
//! Columns of other tables use table-qualified keys (`"orders.user_id"`);
//! they are recorded here but never materialized as local columns.

use serde::Serialize;
use std::collections::BTreeMap;

/// Sink for column-to-property associations
pub trait MappingRegistry {
    /// Associate a column key with a property name
    fn add_mapping(&mut self, column_key: &str, property: &str);
}

/// Bidirectional column key ↔ property name mapping for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityColumnMapping {
    /// Entity name
    entity: String,

    /// Table the entity maps to
    table: String,

    /// Column key -> property
    columns: BTreeMap<String, String>,

    /// Property -> column key
    properties: BTreeMap<String, String>,
}

impl EntityColumnMapping {
    /// Create an empty mapping
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            table: table.into(),
            columns: BTreeMap::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Entity name
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Property mapped to a column key
    pub fn property_for_column(&self, column_key: &str) -> Option<&str> {
        self.columns.get(column_key).map(String::as_str)
    }

    /// Column key a property maps to
    pub fn column_for_property(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    /// All (column key, property) pairs ordered by column key
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(c, p)| (c.as_str(), p.as_str()))
    }

    /// Keys that belong to another table
    pub fn foreign_keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str).filter(|k| is_qualified(k))
    }

    /// Number of mapped properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl MappingRegistry for EntityColumnMapping {
    fn add_mapping(&mut self, column_key: &str, property: &str) {
        if let Some(previous) = self.properties.insert(property.to_string(), column_key.to_string()) {
            if previous != column_key {
                self.columns.remove(&previous);
            }
        }
        if let Some(displaced) = self.columns.insert(column_key.to_string(), property.to_string()) {
            if displaced != property {
                self.properties.remove(&displaced);
            }
        }
    }
}

/// Whether a column key is table-qualified
pub fn is_qualified(column_key: &str) -> bool {
    column_key.contains('.')
}

/// Build a table-qualified column key
pub fn qualified_key(table: &str, column: &str) -> String {
    format!("{}.{}", table, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidirectional_lookup() {
        let mut mapping = EntityColumnMapping::new("User", "users");
        mapping.add_mapping("user_name", "name");

        assert_eq!(mapping.property_for_column("user_name"), Some("name"));
        assert_eq!(mapping.column_for_property("name"), Some("user_name"));
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn remapping_property_replaces_old_key() {
        let mut mapping = EntityColumnMapping::new("User", "users");
        mapping.add_mapping("name", "name");
        mapping.add_mapping("full_name", "name");

        assert_eq!(mapping.column_for_property("name"), Some("full_name"));
        assert_eq!(mapping.property_for_column("name"), None);
        assert_eq!(mapping.entries().count(), 1);
    }

    #[test]
    fn column_claimed_by_new_property() {
        let mut mapping = EntityColumnMapping::new("User", "users");
        mapping.add_mapping("name", "name");
        mapping.add_mapping("name", "displayName");

        assert_eq!(mapping.property_for_column("name"), Some("displayName"));
        assert_eq!(mapping.column_for_property("name"), None);
    }

    #[test]
    fn foreign_keys_are_qualified() {
        let mut mapping = EntityColumnMapping::new("User", "users");
        mapping.add_mapping("id", "id");
        mapping.add_mapping(&qualified_key("profiles", "bio"), "bio");

        assert_eq!(mapping.foreign_keys().collect::<Vec<_>>(), vec!["profiles.bio"]);
        assert!(is_qualified("profiles.bio"));
        assert!(!is_qualified("bio"));
    }
}
