//! Type registry
//!
//! Maps declared codec and data type identifiers to zero-argument factories.
//! Factories run each time a property declares the identifier.

use crate::error::MappingError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tabula_core::{
    DataType, DateTimeCodec, HostType, JsonCodec, SharedCodec, DEFAULT_DATE_TIME_PATTERN,
};

type CodecFactory = Box<dyn Fn() -> Result<SharedCodec, String> + Send + Sync>;
type DataTypeFactory = Box<dyn Fn() -> Result<DataType, String> + Send + Sync>;

/// Factories for declared codecs and data types
#[derive(Default)]
pub struct TypeRegistry {
    codecs: HashMap<String, CodecFactory>,
    data_types: HashMap<String, DataTypeFactory>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `date_time` and `json` codecs
    pub fn with_builtins() -> Self {
        Self::new()
            .with_codec("date_time", || {
                Ok(Arc::new(DateTimeCodec::new(DEFAULT_DATE_TIME_PATTERN, HostType::DateTime)) as SharedCodec)
            })
            .with_codec("json", || Ok(Arc::new(JsonCodec) as SharedCodec))
    }

    /// Register a codec factory
    pub fn register_codec<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<SharedCodec, String> + Send + Sync + 'static,
    {
        self.codecs.insert(id.into(), Box::new(factory));
    }

    /// Register a data type factory
    pub fn register_data_type<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<DataType, String> + Send + Sync + 'static,
    {
        self.data_types.insert(id.into(), Box::new(factory));
    }

    pub fn with_codec<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<SharedCodec, String> + Send + Sync + 'static,
    {
        self.register_codec(id, factory);
        self
    }

    pub fn with_data_type<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<DataType, String> + Send + Sync + 'static,
    {
        self.register_data_type(id, factory);
        self
    }

    /// Instantiate a declared codec
    pub fn instantiate_codec(&self, id: &str) -> Result<SharedCodec, MappingError> {
        let factory = self
            .codecs
            .get(id)
            .ok_or_else(|| MappingError::UnknownCodec(id.to_string()))?;

        factory().map_err(|reason| MappingError::Instantiation {
            id: id.to_string(),
            reason,
        })
    }

    /// Instantiate a declared data type
    pub fn instantiate_data_type(&self, id: &str) -> Result<DataType, MappingError> {
        let factory = self
            .data_types
            .get(id)
            .ok_or_else(|| MappingError::UnknownDataType(id.to_string()))?;

        factory().map_err(|reason| MappingError::Instantiation {
            id: id.to_string(),
            reason,
        })
    }

    /// Registered codec identifiers, sorted
    pub fn codec_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered data type identifiers, sorted
    pub fn data_type_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.data_types.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("codecs", &self.codec_ids())
            .field("data_types", &self.data_type_ids())
            .finish()
    }
}
