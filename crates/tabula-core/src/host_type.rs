//! Host value types
//!
//! The in-memory type of an entity property. Column metadata records it so
//! dialects and value codecs can pick a storage representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of a property value on the host side
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HostType {
    /// Boolean
    Bool,

    /// 8-bit integer
    I8,

    /// 16-bit integer
    I16,

    /// 32-bit integer
    I32,

    /// 64-bit integer
    I64,

    /// 32-bit float
    F32,

    /// 64-bit float
    F64,

    /// Exact decimal, up to 28 significant digits
    Decimal,

    /// Arbitrary precision integer
    BigInteger,

    /// Single character
    Char,

    /// UTF-8 string
    String,

    /// Raw bytes
    Bytes,

    /// Calendar date
    Date,

    /// Time of day
    Time,

    /// Date with time of day
    DateTime,

    /// Instant with sub-second precision
    Timestamp,

    /// UUID
    Uuid,

    /// Arbitrary JSON document
    Json,

    /// Named enumeration
    Enum(String),

    /// Reference to another entity
    Entity(String),

    /// Homogeneous list
    List(Box<HostType>),

    /// Any other named type
    Other(String),
}

impl HostType {
    /// Whether values of this type are points in time
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::DateTime | Self::Timestamp)
    }

    /// Whether values of this type are numbers
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::F32 | Self::F64 | Self::Decimal)
    }

    /// Whether values of this type are whole numbers
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::BigInteger
        )
    }

    /// Inclusive value range for fixed-width integers
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            Self::I8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::I16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::I32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::I64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::I8 => write!(f, "i8"),
            Self::I16 => write!(f, "i16"),
            Self::I32 => write!(f, "i32"),
            Self::I64 => write!(f, "i64"),
            Self::F32 => write!(f, "f32"),
            Self::F64 => write!(f, "f64"),
            Self::Decimal => write!(f, "decimal"),
            Self::BigInteger => write!(f, "bigint"),
            Self::Char => write!(f, "char"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::DateTime => write!(f, "datetime"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Uuid => write!(f, "uuid"),
            Self::Json => write!(f, "json"),
            Self::Enum(name) => write!(f, "enum<{}>", name),
            Self::Entity(name) => write!(f, "entity<{}>", name),
            Self::List(inner) => write!(f, "list<{}>", inner),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Error parsing a host type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid host type: '{0}'")]
pub struct ParseHostTypeError(pub String);

impl FromStr for HostType {
    type Err = ParseHostTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseHostTypeError(s.to_string()));
        }

        // Parameterized forms: enum<..>, entity<..>, list<..>
        if let Some((head, rest)) = s.split_once('<') {
            let inner = rest
                .strip_suffix('>')
                .map(str::trim)
                .filter(|inner| !inner.is_empty())
                .ok_or_else(|| ParseHostTypeError(s.to_string()))?;

            return match head.trim().to_lowercase().as_str() {
                "enum" => Ok(Self::Enum(inner.to_string())),
                "entity" => Ok(Self::Entity(inner.to_string())),
                "list" => Ok(Self::List(Box::new(inner.parse()?))),
                _ => Err(ParseHostTypeError(s.to_string())),
            };
        }

        let parsed = match s.to_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "i8" | "byte" => Self::I8,
            "i16" | "short" => Self::I16,
            "i32" | "int" | "integer" => Self::I32,
            "i64" | "long" => Self::I64,
            "f32" | "float" => Self::F32,
            "f64" | "double" => Self::F64,
            "decimal" => Self::Decimal,
            "bigint" | "biginteger" => Self::BigInteger,
            "char" => Self::Char,
            "string" | "str" => Self::String,
            "bytes" => Self::Bytes,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "uuid" => Self::Uuid,
            "json" => Self::Json,
            _ => Self::Other(s.to_string()),
        };

        Ok(parsed)
    }
}

impl TryFrom<String> for HostType {
    type Error = ParseHostTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HostType> for String {
    fn from(value: HostType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scalar_types() {
        assert_eq!("i64".parse::<HostType>().unwrap(), HostType::I64);
        assert_eq!("Long".parse::<HostType>().unwrap(), HostType::I64);
        assert_eq!("datetime".parse::<HostType>().unwrap(), HostType::DateTime);
        assert_eq!(
            "Money".parse::<HostType>().unwrap(),
            HostType::Other("Money".to_string())
        );
    }

    #[test]
    fn parse_parameterized_types() {
        assert_eq!(
            "list<string>".parse::<HostType>().unwrap(),
            HostType::List(Box::new(HostType::String))
        );
        assert_eq!(
            "enum<Status>".parse::<HostType>().unwrap(),
            HostType::Enum("Status".to_string())
        );
        assert!("list<>".parse::<HostType>().is_err());
        assert!("map<string>".parse::<HostType>().is_err());
    }

    #[test]
    fn display_parses_back() {
        let ty = HostType::List(Box::new(HostType::Entity("Order".to_string())));
        assert_eq!(ty.to_string(), "list<entity<Order>>");
        assert_eq!(ty.to_string().parse::<HostType>().unwrap(), ty);
    }

    #[test]
    fn temporal_and_numeric_classification() {
        assert!(HostType::Date.is_temporal());
        assert!(HostType::Timestamp.is_temporal());
        assert!(!HostType::String.is_temporal());

        assert!(HostType::I32.is_numeric());
        assert!(HostType::Decimal.is_numeric());
        assert!(!HostType::Bool.is_numeric());
        assert!(!HostType::Date.is_numeric());
    }
}
