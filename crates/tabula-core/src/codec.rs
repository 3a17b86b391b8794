//! Value codecs
//!
//! A codec translates between a property's host value and the value stored
//! in its column. Values on both sides are `serde_json::Value`.

use crate::host_type::HostType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Pattern used by default for temporal columns
pub const DEFAULT_DATE_TIME_PATTERN: &str = "yyyy-MM-dd HH:mm:ss";

/// Strategy for converting values between host and storage representation
pub trait ValueCodec: fmt::Debug + Send + Sync {
    /// Short name identifying the codec kind
    fn name(&self) -> &str;

    /// Convert a host value into its stored form
    fn encode(&self, value: &Value) -> Result<Value, CodecError>;

    /// Convert a stored value back into its host form
    fn decode(&self, stored: &Value) -> Result<Value, CodecError>;
}

/// Codec shared between column metadata instances
pub type SharedCodec = Arc<dyn ValueCodec>;

/// Codec error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Cannot convert {value} to {target}")]
    InvalidValue { value: String, target: String },

    #[error("Value {value} is out of range for {target}")]
    OutOfRange { value: String, target: String },
}

impl CodecError {
    fn invalid(value: &Value, target: impl fmt::Display) -> Self {
        Self::InvalidValue {
            value: value.to_string(),
            target: target.to_string(),
        }
    }
}

/// Date-time codec with a `yyyy-MM-dd HH:mm:ss` style pattern
///
/// Stored values are text formatted with the pattern. Host values are epoch
/// milliseconds. Both directions also accept ISO dates and RFC 3339 strings.
/// Supported tokens are `yyyy yy MM M dd d HH H hh h mm m ss s SSS a`; other
/// letters are literal, and `'...'` quotes literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeCodec {
    pattern: String,
    format: String,
    host_type: HostType,
}

impl DateTimeCodec {
    /// Create a codec for the given pattern and host type
    pub fn new(pattern: impl Into<String>, host_type: HostType) -> Self {
        let pattern = pattern.into();
        Self {
            format: to_chrono_format(&pattern),
            pattern,
            host_type,
        }
    }

    /// The date-time pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Host type this codec was created for
    pub fn host_type(&self) -> &HostType {
        &self.host_type
    }

    fn to_date_time(&self, value: &Value) -> Result<Option<NaiveDateTime>, CodecError> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| Some(dt.naive_utc()))
                .ok_or_else(|| CodecError::invalid(value, &self.host_type)),
            Value::String(s) => self
                .parse_text(s.trim())
                .map(Some)
                .ok_or_else(|| CodecError::invalid(value, &self.host_type)),
            _ => Err(CodecError::invalid(value, &self.host_type)),
        }
    }

    fn parse_text(&self, text: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, &self.format) {
            return Some(dt);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, &self.format) {
            return date.and_hms_opt(0, 0, 0);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0);
        }
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.naive_utc())
    }
}

impl ValueCodec for DateTimeCodec {
    fn name(&self) -> &str {
        "date_time"
    }

    fn encode(&self, value: &Value) -> Result<Value, CodecError> {
        Ok(match self.to_date_time(value)? {
            Some(dt) => Value::String(dt.format(&self.format).to_string()),
            None => Value::Null,
        })
    }

    fn decode(&self, stored: &Value) -> Result<Value, CodecError> {
        Ok(match self.to_date_time(stored)? {
            Some(dt) => Value::from(dt.and_utc().timestamp_millis()),
            None => Value::Null,
        })
    }
}

/// Translate a `yyyy-MM-dd HH:mm:ss` style pattern into a chrono format string
///
/// Letters `y M d H h m s S a` are pattern tokens; a single letter means an
/// unpadded field. Text inside single quotes is literal and `''` is a quote.
pub fn to_chrono_format(pattern: &str) -> String {
    const TOKENS: [(&str, &str); 16] = [
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MM", "%m"),
        ("M", "%-m"),
        ("dd", "%d"),
        ("d", "%-d"),
        ("HH", "%H"),
        ("H", "%-H"),
        ("hh", "%I"),
        ("h", "%-I"),
        ("mm", "%M"),
        ("m", "%-M"),
        ("ss", "%S"),
        ("s", "%-S"),
        ("SSS", "%3f"),
        ("a", "%p"),
    ];

    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;

    'outer: while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('\'') {
            rest = push_quoted(&mut out, quoted);
            continue;
        }

        for (token, spec) in TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(spec);
                rest = tail;
                continue 'outer;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            push_literal(&mut out, c);
        }
        rest = chars.as_str();
    }

    out
}

/// Consume a quoted section following an opening quote; returns the rest
fn push_quoted<'p>(out: &mut String, mut quoted: &'p str) -> &'p str {
    if let Some(tail) = quoted.strip_prefix('\'') {
        out.push('\'');
        return tail;
    }

    loop {
        let Some(end) = quoted.find('\'') else {
            quoted.chars().for_each(|c| push_literal(out, c));
            return "";
        };
        quoted[..end].chars().for_each(|c| push_literal(out, c));
        quoted = &quoted[end + 1..];

        match quoted.strip_prefix('\'') {
            Some(tail) => {
                out.push('\'');
                quoted = tail;
            }
            None => return quoted,
        }
    }
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Numeric codec parameterized by the host numeric type
///
/// `Decimal` and `BigInteger` values are kept exact and carried as numeric
/// text; other numeric hosts use plain JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberValueCodec {
    host_type: HostType,
}

impl NumberValueCodec {
    /// Create a codec converting to the given host type
    pub fn new(host_type: HostType) -> Self {
        Self { host_type }
    }

    /// Host type this codec converts to
    pub fn host_type(&self) -> &HostType {
        &self.host_type
    }

    fn convert(&self, value: &Value) -> Result<Value, CodecError> {
        match self.host_type {
            HostType::Decimal => return self.to_decimal(value),
            HostType::BigInteger => return self.to_big_integer(value),
            _ => {}
        }

        let number = match value {
            Value::Null => return Ok(Value::Null),
            Value::Bool(b) => Number::from(*b as i64),
            Value::Number(n) => n.clone(),
            Value::String(s) => s
                .trim()
                .parse::<Number>()
                .map_err(|_| CodecError::invalid(value, &self.host_type))?,
            _ => return Err(CodecError::invalid(value, &self.host_type)),
        };

        if self.host_type.is_integer() {
            let whole = match number.as_i64() {
                Some(i) => i,
                None => {
                    let f = number
                        .as_f64()
                        .ok_or_else(|| CodecError::invalid(value, &self.host_type))?;
                    if !f.is_finite() || f < i64::MIN as f64 || f > i64::MAX as f64 {
                        return Err(CodecError::OutOfRange {
                            value: value.to_string(),
                            target: self.host_type.to_string(),
                        });
                    }
                    f.trunc() as i64
                }
            };

            if let Some((min, max)) = self.host_type.integer_range() {
                if whole < min || whole > max {
                    return Err(CodecError::OutOfRange {
                        value: value.to_string(),
                        target: self.host_type.to_string(),
                    });
                }
            }
            return Ok(Value::from(whole));
        }

        let float = number
            .as_f64()
            .ok_or_else(|| CodecError::invalid(value, &self.host_type))?;
        Number::from_f64(float)
            .map(Value::Number)
            .ok_or_else(|| CodecError::invalid(value, &self.host_type))
    }

    fn to_decimal(&self, value: &Value) -> Result<Value, CodecError> {
        let Some(text) = numeric_text(value) else {
            return exact_passthrough(value, &self.host_type);
        };

        let decimal = Decimal::from_str_exact(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| CodecError::invalid(value, &self.host_type))?;
        Ok(Value::String(decimal.to_string()))
    }

    fn to_big_integer(&self, value: &Value) -> Result<Value, CodecError> {
        let Some(text) = numeric_text(value) else {
            return exact_passthrough(value, &self.host_type);
        };

        // Fractions truncate toward zero
        let whole = match text.split_once('.') {
            Some((whole, fraction)) if fraction.chars().all(|c| c.is_ascii_digit()) => whole,
            _ => text.as_str(),
        };

        let integer = match BigInt::from_str(whole) {
            Ok(integer) => integer,
            Err(_) => Decimal::from_scientific(&text)
                .map_err(|_| CodecError::invalid(value, &self.host_type))?
                .trunc()
                .to_string()
                .parse::<BigInt>()
                .map_err(|_| CodecError::invalid(value, &self.host_type))?,
        };
        Ok(Value::String(integer.to_string()))
    }
}

/// Numeric text of a scalar, or `None` for null and non-scalars
fn numeric_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn exact_passthrough(value: &Value, host_type: &HostType) -> Result<Value, CodecError> {
    match value {
        Value::Null => Ok(Value::Null),
        _ => Err(CodecError::invalid(value, host_type)),
    }
}

impl ValueCodec for NumberValueCodec {
    fn name(&self) -> &str {
        "number"
    }

    fn encode(&self, value: &Value) -> Result<Value, CodecError> {
        self.convert(value)
    }

    fn decode(&self, stored: &Value) -> Result<Value, CodecError> {
        self.convert(stored)
    }
}

/// Stores any value as JSON text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn encode(&self, value: &Value) -> Result<Value, CodecError> {
        Ok(match value {
            Value::Null => Value::Null,
            other => Value::String(other.to_string()),
        })
    }

    fn decode(&self, stored: &Value) -> Result<Value, CodecError> {
        match stored {
            Value::String(text) => {
                serde_json::from_str(text).map_err(|_| CodecError::invalid(stored, "json"))
            }
            other => Ok(other.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chrono_format_translation() {
        assert_eq!(to_chrono_format(DEFAULT_DATE_TIME_PATTERN), "%Y-%m-%d %H:%M:%S");
        assert_eq!(to_chrono_format("dd/MM/yy hh:mm a"), "%d/%m/%y %I:%M %p");
        assert_eq!(to_chrono_format("yyyy%MM"), "%Y%%%m");
    }

    #[test]
    fn chrono_format_quotes_and_short_tokens() {
        assert_eq!(to_chrono_format("yyyy-MM-dd'T'HH:mm:ss"), "%Y-%m-%dT%H:%M:%S");
        assert_eq!(to_chrono_format("d/M/yyyy H:m"), "%-d/%-m/%Y %-H:%-M");
        assert_eq!(to_chrono_format("hh 'o''clock' a"), "%I o'clock %p");
        assert_eq!(to_chrono_format("'at' HH''mm"), "at %H'%M");
        assert_eq!(to_chrono_format("'unterminated"), "unterminated");
    }

    #[test]
    fn date_time_codec_with_quoted_literal() {
        let codec = DateTimeCodec::new("yyyy-MM-dd'T'HH:mm", HostType::DateTime);

        assert_eq!(codec.encode(&json!(0)).unwrap(), json!("1970-01-01T00:00"));
        assert_eq!(codec.decode(&json!("1970-01-01T00:01")).unwrap(), json!(60_000));
    }

    #[test]
    fn date_time_encode_from_millis_and_text() {
        let codec = DateTimeCodec::new(DEFAULT_DATE_TIME_PATTERN, HostType::DateTime);

        assert_eq!(codec.encode(&json!(0)).unwrap(), json!("1970-01-01 00:00:00"));
        assert_eq!(
            codec.encode(&json!("2024-03-01T10:20:30Z")).unwrap(),
            json!("2024-03-01 10:20:30")
        );
        assert_eq!(codec.encode(&json!("2024-03-01")).unwrap(), json!("2024-03-01 00:00:00"));
        assert_eq!(codec.encode(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn date_time_decode_to_millis() {
        let codec = DateTimeCodec::new(DEFAULT_DATE_TIME_PATTERN, HostType::Date);

        assert_eq!(codec.decode(&json!("1970-01-01 00:00:01")).unwrap(), json!(1000));
        assert!(codec.decode(&json!("not a date")).is_err());
        assert!(codec.decode(&json!(true)).is_err());
    }

    #[test]
    fn number_codec_integer_conversion() {
        let codec = NumberValueCodec::new(HostType::I32);

        assert_eq!(codec.decode(&json!("42")).unwrap(), json!(42));
        assert_eq!(codec.decode(&json!(3.9)).unwrap(), json!(3));
        assert_eq!(codec.decode(&json!(true)).unwrap(), json!(1));
        assert_eq!(codec.decode(&Value::Null).unwrap(), Value::Null);
        assert!(matches!(
            codec.decode(&json!(5_000_000_000i64)),
            Err(CodecError::OutOfRange { .. })
        ));
        assert!(codec.encode(&json!("forty two")).is_err());
    }

    #[test]
    fn number_codec_float_conversion() {
        let codec = NumberValueCodec::new(HostType::F64);

        assert_eq!(codec.encode(&json!("1.5")).unwrap(), json!(1.5));
        assert_eq!(codec.encode(&json!(2)).unwrap(), json!(2.0));
    }

    #[test]
    fn big_integer_beyond_i64_is_exact() {
        let codec = NumberValueCodec::new(HostType::BigInteger);

        assert_eq!(
            codec.decode(&json!("100000000000000000000")).unwrap(),
            json!("100000000000000000000")
        );
        assert_eq!(codec.encode(&json!(-42)).unwrap(), json!("-42"));
        assert_eq!(codec.encode(&json!("7.9")).unwrap(), json!("7"));
        assert_eq!(codec.encode(&json!("1e20")).unwrap(), json!("100000000000000000000"));
        assert_eq!(codec.decode(&Value::Null).unwrap(), Value::Null);
        assert!(codec.decode(&json!("ten")).is_err());
        assert!(codec.decode(&json!([1])).is_err());
    }

    #[test]
    fn decimal_keeps_every_digit() {
        let codec = NumberValueCodec::new(HostType::Decimal);

        assert_eq!(
            codec.decode(&json!("12345678901234567.89")).unwrap(),
            json!("12345678901234567.89")
        );
        assert_eq!(codec.encode(&json!(1.5)).unwrap(), json!("1.5"));
        assert_eq!(codec.encode(&json!("2.50")).unwrap(), json!("2.50"));
        assert!(codec.encode(&json!("1.2.3")).is_err());
    }

    #[test]
    fn json_codec_round_trips_documents() {
        let codec = JsonCodec;
        let doc = json!({"tags": ["a", "b"]});

        let stored = codec.encode(&doc).unwrap();
        assert!(stored.is_string());
        assert_eq!(codec.decode(&stored).unwrap(), doc);
    }
}
