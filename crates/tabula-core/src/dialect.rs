//! SQL dialects
//!
//! A dialect answers two questions for the mapping pass: which storage kind
//! a host type defaults to, and what SQL type text a fully populated column
//! materializes to.

use crate::config::DialectConfig;
use crate::data_type::StorageKind;
use crate::host_type::HostType;
use crate::metadata::ColumnMetadata;
use std::collections::HashMap;
use std::fmt;

/// Storage-engine specific type mapping rules
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Dialect name (e.g., "PostgreSQL")
    fn name(&self) -> &'static str;

    /// Storage kind a host type maps to, if the dialect has an opinion
    fn storage_kind_for(&self, host_type: &HostType) -> Option<StorageKind>;

    /// Concrete SQL type text for a populated column
    ///
    /// Returns `None` when the column has neither a raw definition nor a
    /// data type.
    fn create_column_data_type(&self, column: &ColumnMetadata) -> Option<String>;
}

/// How a storage kind renders into SQL type text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTemplate {
    /// Fixed text, e.g. `bigint`
    Plain(&'static str),

    /// Text with a length suffix, e.g. `varchar(255)`
    Length(&'static str),

    /// Text with precision and scale, e.g. `numeric(10,2)`
    PrecisionScale(&'static str),
}

impl TypeTemplate {
    /// Render for a column
    pub fn render(&self, column: &ColumnMetadata) -> String {
        match self {
            Self::Plain(text) => (*text).to_string(),
            Self::Length(text) if column.length > 0 => format!("{}({})", text, column.length),
            Self::Length(text) => (*text).to_string(),
            Self::PrecisionScale(text) if column.precision > 0 => {
                format!("{}({},{})", text, column.precision, column.scale)
            }
            Self::PrecisionScale(text) => (*text).to_string(),
        }
    }
}

/// Table-driven dialect covering the common relational engines
#[derive(Debug, Clone)]
pub struct SqlDialect {
    name: &'static str,

    /// Templates by storage kind
    kinds: HashMap<StorageKind, TypeTemplate>,

    /// Templates by custom data type id
    custom: HashMap<String, TypeTemplate>,

    /// Host type overrides applied before the shared defaults
    host_overrides: HashMap<HostType, StorageKind>,
}

impl SqlDialect {
    fn base(name: &'static str) -> Self {
        use StorageKind::*;
        use TypeTemplate::*;

        let kinds = HashMap::from([
            (Boolean, Plain("boolean")),
            (Bit, Plain("bit")),
            (TinyInt, Plain("tinyint")),
            (SmallInt, Plain("smallint")),
            (Integer, Plain("integer")),
            (BigInt, Plain("bigint")),
            (Real, Plain("real")),
            (Float, Plain("float")),
            (Double, Plain("double")),
            (Numeric, PrecisionScale("numeric")),
            (Decimal, PrecisionScale("decimal")),
            (Char, Length("char")),
            (Varchar, Length("varchar")),
            (Nvarchar, Length("nvarchar")),
            (LongVarchar, Plain("clob")),
            (Clob, Plain("clob")),
            (Binary, Length("binary")),
            (Varbinary, Length("varbinary")),
            (LongVarbinary, Plain("blob")),
            (Blob, Plain("blob")),
            (Date, Plain("date")),
            (Time, Plain("time")),
            (Timestamp, Plain("timestamp")),
        ]);

        Self {
            name,
            kinds,
            custom: HashMap::new(),
            host_overrides: HashMap::new(),
        }
    }

    /// Generic ANSI SQL
    pub fn ansi() -> Self {
        Self::base("ANSI")
    }

    /// H2 database
    pub fn h2() -> Self {
        Self::base("H2")
            .with_kind(StorageKind::Double, TypeTemplate::Plain("double precision"))
            .with_custom("uuid", TypeTemplate::Plain("uuid"))
    }

    /// PostgreSQL; `OTHER` storage renders as `jsonb`
    pub fn postgres() -> Self {
        use StorageKind::*;
        use TypeTemplate::*;

        Self::base("PostgreSQL")
            .with_kind(TinyInt, Plain("smallint"))
            .with_kind(Float, Plain("real"))
            .with_kind(Double, Plain("double precision"))
            .with_kind(Nvarchar, Length("varchar"))
            .with_kind(LongVarchar, Plain("text"))
            .with_kind(Clob, Plain("text"))
            .with_kind(Binary, Plain("bytea"))
            .with_kind(Varbinary, Plain("bytea"))
            .with_kind(LongVarbinary, Plain("bytea"))
            .with_kind(Blob, Plain("bytea"))
            .with_kind(Other, Plain("jsonb"))
            .with_custom("jsonb", Plain("jsonb"))
            .with_custom("json", Plain("json"))
            .with_custom("uuid", Plain("uuid"))
            .with_host_override(HostType::Json, Other)
    }

    /// MySQL / MariaDB
    pub fn mysql() -> Self {
        use StorageKind::*;
        use TypeTemplate::*;

        Self::base("MySQL")
            .with_kind(Boolean, Plain("tinyint(1)"))
            .with_kind(Timestamp, Plain("datetime"))
            .with_kind(LongVarchar, Plain("longtext"))
            .with_kind(Clob, Plain("longtext"))
            .with_kind(LongVarbinary, Plain("longblob"))
            .with_kind(Blob, Plain("longblob"))
            .with_custom("json", Plain("json"))
    }

    /// Build the dialect selected in configuration
    pub fn from_config(config: &DialectConfig) -> Self {
        match config {
            DialectConfig::Postgres => Self::postgres(),
            DialectConfig::MySql => Self::mysql(),
            DialectConfig::H2 => Self::h2(),
            DialectConfig::Ansi => Self::ansi(),
        }
    }

    /// Override the template of a storage kind
    pub fn with_kind(mut self, kind: StorageKind, template: TypeTemplate) -> Self {
        self.kinds.insert(kind, template);
        self
    }

    /// Register a template for a custom data type id
    pub fn with_custom(mut self, id: impl Into<String>, template: TypeTemplate) -> Self {
        self.custom.insert(id.into(), template);
        self
    }

    /// Map a host type to a storage kind ahead of the shared defaults
    pub fn with_host_override(mut self, host_type: HostType, kind: StorageKind) -> Self {
        self.host_overrides.insert(host_type, kind);
        self
    }
}

/// Storage kind shared by all built-in dialects
pub fn default_storage_kind(host_type: &HostType) -> Option<StorageKind> {
    let kind = match host_type {
        HostType::Bool => StorageKind::Boolean,
        HostType::I8 => StorageKind::TinyInt,
        HostType::I16 => StorageKind::SmallInt,
        HostType::I32 => StorageKind::Integer,
        HostType::I64 => StorageKind::BigInt,
        HostType::F32 => StorageKind::Float,
        HostType::F64 => StorageKind::Double,
        HostType::Decimal | HostType::BigInteger => StorageKind::Decimal,
        HostType::Char => StorageKind::Char,
        HostType::String | HostType::Uuid | HostType::Enum(_) => StorageKind::Varchar,
        HostType::Bytes => StorageKind::Blob,
        HostType::Date | HostType::DateTime | HostType::Timestamp => StorageKind::Timestamp,
        HostType::Time => StorageKind::Time,
        HostType::Json => StorageKind::LongVarchar,
        HostType::Entity(_) | HostType::List(_) | HostType::Other(_) => return None,
    };
    Some(kind)
}

impl Dialect for SqlDialect {
    fn name(&self) -> &'static str {
        self.name
    }

    fn storage_kind_for(&self, host_type: &HostType) -> Option<StorageKind> {
        self.host_overrides
            .get(host_type)
            .copied()
            .or_else(|| default_storage_kind(host_type))
    }

    fn create_column_data_type(&self, column: &ColumnMetadata) -> Option<String> {
        if let Some(definition) = &column.column_definition {
            return Some(definition.clone());
        }

        let data_type = column.data_type.as_ref()?;

        if data_type.is_custom() {
            return Some(match self.custom.get(&data_type.id) {
                Some(template) => template.render(column),
                None => data_type.id.clone(),
            });
        }

        Some(match self.kinds.get(&data_type.storage_kind) {
            Some(template) => template.render(column),
            None => data_type.id.clone(),
        })
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_type::DataType;

    fn column(kind: StorageKind) -> ColumnMetadata {
        let mut column = ColumnMetadata::new("c");
        column.set_storage_kind(kind, None);
        column
    }

    #[test]
    fn default_storage_kinds() {
        let dialect = SqlDialect::ansi();
        assert_eq!(dialect.storage_kind_for(&HostType::I64), Some(StorageKind::BigInt));
        assert_eq!(dialect.storage_kind_for(&HostType::Date), Some(StorageKind::Timestamp));
        assert_eq!(
            dialect.storage_kind_for(&HostType::Enum("Status".into())),
            Some(StorageKind::Varchar)
        );
        assert_eq!(dialect.storage_kind_for(&HostType::Entity("Order".into())), None);
    }

    #[test]
    fn host_override_wins() {
        let dialect = SqlDialect::postgres();
        assert_eq!(dialect.storage_kind_for(&HostType::Json), Some(StorageKind::Other));
        assert_eq!(
            SqlDialect::mysql().storage_kind_for(&HostType::Json),
            Some(StorageKind::LongVarchar)
        );
    }

    #[test]
    fn renders_length_and_precision() {
        let dialect = SqlDialect::postgres();

        let mut name = column(StorageKind::Varchar);
        name.length = 64;
        assert_eq!(dialect.create_column_data_type(&name).as_deref(), Some("varchar(64)"));

        let mut amount = column(StorageKind::Decimal);
        amount.precision = 10;
        amount.scale = 2;
        assert_eq!(dialect.create_column_data_type(&amount).as_deref(), Some("decimal(10,2)"));

        let bare = column(StorageKind::Numeric);
        assert_eq!(dialect.create_column_data_type(&bare).as_deref(), Some("numeric"));
    }

    #[test]
    fn dialect_specific_templates() {
        assert_eq!(
            SqlDialect::postgres().create_column_data_type(&column(StorageKind::Blob)).as_deref(),
            Some("bytea")
        );
        assert_eq!(
            SqlDialect::mysql().create_column_data_type(&column(StorageKind::Timestamp)).as_deref(),
            Some("datetime")
        );
    }

    #[test]
    fn postgres_json_host_renders_jsonb() {
        let dialect = SqlDialect::postgres();
        let kind = dialect.storage_kind_for(&HostType::Json).unwrap();

        let mut payload = ColumnMetadata::new("payload");
        payload.set_storage_kind(kind, Some(HostType::Json));
        assert_eq!(dialect.create_column_data_type(&payload).as_deref(), Some("jsonb"));
    }

    #[test]
    fn column_definition_wins() {
        let mut col = column(StorageKind::Varchar);
        col.column_definition = Some("varchar(32) not null".to_string());
        assert_eq!(
            SqlDialect::ansi().create_column_data_type(&col).as_deref(),
            Some("varchar(32) not null")
        );
    }

    #[test]
    fn custom_types() {
        let mut col = ColumnMetadata::new("payload");
        col.data_type = Some(DataType::custom("jsonb", "jsonb", StorageKind::Other));
        assert_eq!(SqlDialect::postgres().create_column_data_type(&col).as_deref(), Some("jsonb"));

        col.data_type = Some(DataType::custom("geometry", "geometry", StorageKind::Other));
        assert_eq!(SqlDialect::ansi().create_column_data_type(&col).as_deref(), Some("geometry"));
    }

    #[test]
    fn no_data_type_yields_none() {
        assert_eq!(SqlDialect::ansi().create_column_data_type(&ColumnMetadata::new("x")), None);
    }
}
