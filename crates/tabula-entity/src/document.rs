//! Entity documents
//!
//! Entities authored as TOML or JSON. A document lists entity definitions;
//! `extends` may reference any entity in the same document regardless of
//! order.
//!
//! ```toml
//! [[entities]]
//! name = "User"
//! extends = "Base"
//! table = { name = "users", indexes = [{ column_list = "email", unique = true }] }
//!
//! [[entities.properties]]
//! name = "email"
//! type = "string"
//! annotations = [{ kind = "column", nullable = false }]
//! ```

use crate::annotation::{Annotation, Table};
use crate::model::{EntityBuilder, EntityType, FieldDecl, MethodDecl};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tabula_core::HostType;

/// A document of entity definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(default)]
    pub entities: Vec<EntityDef>,
}

/// One entity definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,

    /// Name of the superclass entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Table annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,

    /// Fields declared without accessors
    #[serde(default)]
    pub fields: Vec<MemberDef>,

    /// Methods
    #[serde(default)]
    pub methods: Vec<MethodDef>,

    /// Fields declared together with a getter and a setter
    #[serde(default)]
    pub properties: Vec<MemberDef>,
}

/// A field or property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDef {
    pub name: String,

    #[serde(rename = "type")]
    pub host_type: HostType,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MemberDef {
    fn to_field(&self) -> FieldDecl {
        self.annotations
            .iter()
            .cloned()
            .fold(FieldDecl::new(&self.name, self.host_type.clone()), FieldDecl::annotate)
    }
}

/// A method definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,

    #[serde(default)]
    pub params: Vec<HostType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<HostType>,

    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl MethodDef {
    fn to_method(&self) -> MethodDecl {
        self.annotations.iter().cloned().fold(
            MethodDecl::new(&self.name, self.params.clone(), self.returns.clone()),
            MethodDecl::annotate,
        )
    }
}

impl EntityDocument {
    /// Load a document, choosing the format by file extension
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DocumentError::IoError(path.display().to_string(), e.to_string()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_toml(&contents),
        }
    }

    /// Parse a TOML document
    pub fn from_toml(toml: &str) -> Result<Self, DocumentError> {
        toml::from_str(toml).map_err(|e| DocumentError::ParseError(e.to_string()))
    }

    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::ParseError(e.to_string()))
    }
}

/// Linked entity types, keyed by name
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entities: BTreeMap<String, Arc<EntityType>>,

    /// Definition order
    order: Vec<String>,
}

impl EntityCatalog {
    /// Link every definition in a document
    pub fn from_document(document: &EntityDocument) -> Result<Self, DocumentError> {
        let mut defs: HashMap<&str, &EntityDef> = HashMap::new();
        for def in &document.entities {
            if defs.insert(def.name.as_str(), def).is_some() {
                return Err(DocumentError::DuplicateEntity(def.name.clone()));
            }
        }

        let mut catalog = Self::default();
        for def in &document.entities {
            let mut visiting = HashSet::new();
            catalog.link(def, &defs, &mut visiting)?;
        }
        catalog.order = document.entities.iter().map(|d| d.name.clone()).collect();

        tracing::debug!(entities = catalog.order.len(), "linked entity document");
        Ok(catalog)
    }

    /// Load and link a document file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        Self::from_document(&EntityDocument::from_file(path)?)
    }

    fn link<'d>(
        &mut self,
        def: &'d EntityDef,
        defs: &HashMap<&'d str, &'d EntityDef>,
        visiting: &mut HashSet<&'d str>,
    ) -> Result<Arc<EntityType>, DocumentError> {
        if let Some(entity) = self.entities.get(&def.name) {
            return Ok(Arc::clone(entity));
        }
        if !visiting.insert(def.name.as_str()) {
            return Err(DocumentError::InheritanceCycle(def.name.clone()));
        }

        let mut builder: EntityBuilder = EntityType::builder(&def.name);

        if let Some(parent_name) = &def.extends {
            let parent_def = defs.get(parent_name.as_str()).copied().ok_or_else(|| {
                DocumentError::UnknownParent {
                    entity: def.name.clone(),
                    parent: parent_name.clone(),
                }
            })?;
            builder = builder.extends(self.link(parent_def, defs, visiting)?);
        }

        if let Some(table) = &def.table {
            builder = builder.annotate(table.clone());
        }
        for field in &def.fields {
            builder = builder.field(field.to_field());
        }
        for property in &def.properties {
            builder = builder.property_with(property.to_field());
        }
        for method in &def.methods {
            builder = builder.method(method.to_method());
        }

        let entity = builder.build();
        self.entities.insert(def.name.clone(), Arc::clone(&entity));
        Ok(entity)
    }

    /// Entity by name
    pub fn get(&self, name: &str) -> Option<&Arc<EntityType>> {
        self.entities.get(name)
    }

    /// Entities in definition order
    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.order.iter().filter_map(|name| self.entities.get(name))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Document error types
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read {0}: {1}")]
    IoError(String, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Entity '{0}' is defined more than once")]
    DuplicateEntity(String),

    #[error("Entity '{entity}' extends unknown entity '{parent}'")]
    UnknownParent { entity: String, parent: String },

    #[error("Inheritance cycle through entity '{0}'")]
    InheritanceCycle(String),
}
