//! Mapping error types

/// Errors raised while mapping an entity onto a table
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("Unknown value codec '{0}'")]
    UnknownCodec(String),

    #[error("Unknown data type '{0}'")]
    UnknownDataType(String),

    #[error("Failed to instantiate '{id}': {reason}")]
    Instantiation { id: String, reason: String },

    #[error("Property '{property}' of entity '{entity}': {source}")]
    Property {
        entity: String,
        property: String,
        #[source]
        source: Box<MappingError>,
    },

    #[error("{} properties failed to map", .0.len())]
    Collected(Vec<MappingError>),
}

impl MappingError {
    /// Attach entity and property context
    pub fn in_property(self, entity: &str, property: &str) -> Self {
        Self::Property {
            entity: entity.to_string(),
            property: property.to_string(),
            source: Box::new(self),
        }
    }

    /// Whether the error stems from declared type or codec wiring
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::UnknownCodec(_) | Self::UnknownDataType(_) | Self::Instantiation { .. } => true,
            Self::Property { source, .. } => source.is_configuration(),
            Self::Collected(errors) => errors.iter().all(MappingError::is_configuration),
        }
    }
}
