//! PostgreSQL row to JSON conversion.
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `TypeCategory` classifies the column's PostgreSQL type name
//! 2. A per-category decoder extracts the value as JSON
//!
//! Values that cannot be decoded become `null` and are logged at warn level;
//! a single odd column never fails the whole query.

use crate::models::ResultRow;
use serde_json::Value as JsonValue;
use sqlx::postgres::types::{Oid, PgInterval, PgRange, PgTimeTz};
use sqlx::postgres::{PgHasArrayType, PgRow, PgTypeInfo, PgTypeKind, PgValueFormat, PgValueRef};
use sqlx::types::BigDecimal;
use sqlx::types::ipnetwork::IpNetwork;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};
use std::fmt::Write as _;

// =============================================================================
// Type Classification
// =============================================================================

/// Logical category for PostgreSQL column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    SmallInt,
    Integer,
    BigInt,
    Oid,
    Float,
    Decimal,
    Boolean,
    Char,
    Text,
    Binary,
    Json,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    TimeTz,
    Interval,
    Inet,
    Cidr,
    Range,
    TextArray,
    IntegerArray,
    BoolArray,
    FloatArray,
    NumericArray,
    UuidArray,
    JsonArray,
    Unknown,
}

/// Classify a PostgreSQL type name (as reported by the driver) into a category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    match type_name.to_ascii_uppercase().as_str() {
        "INT2" | "SMALLINT" | "SMALLSERIAL" => TypeCategory::SmallInt,
        "INT4" | "INT" | "INTEGER" | "SERIAL" => TypeCategory::Integer,
        "INT8" | "BIGINT" | "BIGSERIAL" => TypeCategory::BigInt,
        "OID" => TypeCategory::Oid,
        "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE PRECISION" => TypeCategory::Float,
        "NUMERIC" | "DECIMAL" => TypeCategory::Decimal,
        "BOOL" | "BOOLEAN" => TypeCategory::Boolean,
        // The single-byte internal type; plain CHAR(n) is reported as "CHAR"
        "\"CHAR\"" => TypeCategory::Char,
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "CITEXT" | "UNKNOWN" => {
            TypeCategory::Text
        }
        "BYTEA" => TypeCategory::Binary,
        "JSON" | "JSONB" => TypeCategory::Json,
        "UUID" => TypeCategory::Uuid,
        "TIMESTAMP" => TypeCategory::Timestamp,
        "TIMESTAMPTZ" => TypeCategory::TimestampTz,
        "DATE" => TypeCategory::Date,
        "TIME" => TypeCategory::Time,
        "TIMETZ" => TypeCategory::TimeTz,
        "INTERVAL" => TypeCategory::Interval,
        "INET" => TypeCategory::Inet,
        "CIDR" => TypeCategory::Cidr,
        "INT4RANGE" | "INT8RANGE" | "NUMRANGE" | "DATERANGE" | "TSRANGE" | "TSTZRANGE" => {
            TypeCategory::Range
        }
        "TEXT[]" | "VARCHAR[]" | "NAME[]" | "BPCHAR[]" | "CHAR[]" | "CITEXT[]" => {
            TypeCategory::TextArray
        }
        "INT2[]" | "INT4[]" | "INT8[]" => TypeCategory::IntegerArray,
        "BOOL[]" => TypeCategory::BoolArray,
        "FLOAT4[]" | "FLOAT8[]" => TypeCategory::FloatArray,
        "NUMERIC[]" => TypeCategory::NumericArray,
        "UUID[]" => TypeCategory::UuidArray,
        "JSON[]" | "JSONB[]" => TypeCategory::JsonArray,
        _ => TypeCategory::Unknown,
    }
}

// =============================================================================
// Decimal Type Support
// =============================================================================

const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// A NUMERIC rendered as text with the column's display scale.
///
/// `BigDecimal` cannot hold `NaN` or the infinities, so the sign word of the
/// binary header is checked first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericText(pub String);

impl Type<Postgres> for NumericText {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(1700))
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        ty.name().eq_ignore_ascii_case("NUMERIC")
    }
}

impl PgHasArrayType for NumericText {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(1231))
    }

    fn array_compatible(ty: &PgTypeInfo) -> bool {
        ty.name().eq_ignore_ascii_case("NUMERIC[]")
    }
}

impl<'r> Decode<'r, Postgres> for NumericText {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        if value.format() == PgValueFormat::Text {
            return Ok(NumericText(value.as_str()?.to_string()));
        }

        let bytes = value.as_bytes()?;
        let (sign, dscale) = numeric_header(bytes)?;
        if let Some(special) = numeric_special(sign) {
            return Ok(NumericText(special.to_string()));
        }

        let decimal = <BigDecimal as Decode<Postgres>>::decode(value)?;
        Ok(NumericText(decimal.with_scale(i64::from(dscale)).to_plain_string()))
    }
}

/// Sign word and display scale from a binary NUMERIC header.
fn numeric_header(bytes: &[u8]) -> Result<(u16, u16), sqlx::error::BoxDynError> {
    let word = |pos: usize| {
        bytes
            .get(pos..pos + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or("truncated NUMERIC header")
    };
    Ok((word(4)?, word(6)?))
}

fn numeric_special(sign: u16) -> Option<&'static str> {
    match sign {
        NUMERIC_NAN => Some("NaN"),
        NUMERIC_PINF => Some("Infinity"),
        NUMERIC_NINF => Some("-Infinity"),
        _ => None,
    }
}

// =============================================================================
// Interval / Network Rendering
// =============================================================================

/// Render an interval as an ISO 8601 duration (`P1Y2M3DT4H5M6.5S`).
///
/// Months, days and microseconds are kept apart as PostgreSQL stores them;
/// nothing is normalized across those boundaries.
pub fn interval_to_iso8601(interval: &PgInterval) -> String {
    const MICROS_PER_HOUR: i64 = 3_600_000_000;
    const MICROS_PER_MINUTE: i64 = 60_000_000;
    const MICROS_PER_SECOND: i64 = 1_000_000;

    let mut out = String::from("P");
    let (years, months) = (interval.months / 12, interval.months % 12);
    if years != 0 {
        let _ = write!(out, "{years}Y");
    }
    if months != 0 {
        let _ = write!(out, "{months}M");
    }
    if interval.days != 0 {
        let _ = write!(out, "{}D", interval.days);
    }

    let micros = interval.microseconds;
    if micros != 0 {
        out.push('T');
        let hours = micros / MICROS_PER_HOUR;
        let minutes = (micros % MICROS_PER_HOUR) / MICROS_PER_MINUTE;
        let rest = micros % MICROS_PER_MINUTE;
        if hours != 0 {
            let _ = write!(out, "{hours}H");
        }
        if minutes != 0 {
            let _ = write!(out, "{minutes}M");
        }
        if rest != 0 {
            let seconds = rest / MICROS_PER_SECOND;
            let fraction = (rest % MICROS_PER_SECOND).abs();
            if rest < 0 && seconds == 0 {
                out.push('-');
            }
            let _ = write!(out, "{seconds}");
            if fraction != 0 {
                let digits = format!("{fraction:06}");
                let _ = write!(out, ".{}", digits.trim_end_matches('0'));
            }
            out.push('S');
        }
    }

    if out == "P" {
        out.push_str("T0S");
    }
    out
}

/// `inet` host addresses print without the prefix, as `psql` shows them.
fn inet_to_string(network: &IpNetwork) -> String {
    let full = if network.is_ipv4() { 32 } else { 128 };
    if network.prefix() == full {
        network.ip().to_string()
    } else {
        network.to_string()
    }
}

// =============================================================================
// Binary Encoding
// =============================================================================

/// Decode binary data to JSON value.
///
/// Valid UTF-8 is returned as text, anything else as base64.
pub fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

// =============================================================================
// Row to JSON Trait
// =============================================================================

/// Trait for converting database rows to ordered JSON maps.
pub trait RowToJson {
    fn to_json_map(&self) -> ResultRow;
}

impl RowToJson for PgRow {
    fn to_json_map(&self) -> ResultRow {
        self.columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let type_info = col.type_info();
                let value = match categorize_type(type_info.name()) {
                    TypeCategory::Unknown => decode_unknown(self, idx, type_info),
                    category => decode_column(self, idx, category),
                };
                (col.name().to_string(), value)
            })
            .collect()
    }
}

fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> JsonValue {
    match category {
        TypeCategory::SmallInt => decode_as::<i16>(row, idx, |v| JsonValue::Number(v.into())),
        TypeCategory::Integer => decode_as::<i32>(row, idx, |v| JsonValue::Number(v.into())),
        TypeCategory::BigInt => decode_as::<i64>(row, idx, |v| JsonValue::Number(v.into())),
        TypeCategory::Oid => decode_as::<Oid>(row, idx, |v| JsonValue::Number(v.0.into())),
        TypeCategory::Float => decode_float(row, idx),
        TypeCategory::Decimal => decode_as::<NumericText>(row, idx, |v| JsonValue::String(v.0)),
        TypeCategory::Boolean => decode_as::<bool>(row, idx, JsonValue::Bool),
        TypeCategory::Char => decode_as::<i8>(row, idx, |v| {
            JsonValue::String(char::from(v as u8).to_string())
        }),
        TypeCategory::Binary => decode_as::<Vec<u8>>(row, idx, |v| decode_binary_value(&v)),
        TypeCategory::Json => decode_as::<JsonValue>(row, idx, |v| v),
        TypeCategory::Uuid => decode_as::<sqlx::types::Uuid>(row, idx, |v| {
            JsonValue::String(v.hyphenated().to_string())
        }),
        TypeCategory::Timestamp => decode_as::<chrono::NaiveDateTime>(row, idx, |v| {
            JsonValue::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }),
        TypeCategory::TimestampTz => {
            decode_as::<chrono::DateTime<chrono::Utc>>(row, idx, |v| {
                JsonValue::String(v.to_rfc3339())
            })
        }
        TypeCategory::Date => {
            decode_as::<chrono::NaiveDate>(row, idx, |v| JsonValue::String(v.to_string()))
        }
        TypeCategory::Time => {
            decode_as::<chrono::NaiveTime>(row, idx, |v| JsonValue::String(v.to_string()))
        }
        TypeCategory::TimeTz => decode_as::<PgTimeTz<chrono::NaiveTime, chrono::FixedOffset>>(
            row,
            idx,
            |v| JsonValue::String(format!("{}{}", v.time, v.offset)),
        ),
        TypeCategory::Interval => decode_as::<PgInterval>(row, idx, |v| {
            JsonValue::String(interval_to_iso8601(&v))
        }),
        TypeCategory::Inet => {
            decode_as::<IpNetwork>(row, idx, |v| JsonValue::String(inet_to_string(&v)))
        }
        TypeCategory::Cidr => {
            decode_as::<IpNetwork>(row, idx, |v| JsonValue::String(v.to_string()))
        }
        TypeCategory::Range => decode_range(row, idx),
        TypeCategory::TextArray => decode_array::<String>(row, idx, JsonValue::String),
        TypeCategory::IntegerArray => decode_integer_array(row, idx),
        TypeCategory::BoolArray => decode_array::<bool>(row, idx, JsonValue::Bool),
        TypeCategory::FloatArray => decode_float_array(row, idx),
        TypeCategory::NumericArray => {
            decode_array::<NumericText>(row, idx, |v| JsonValue::String(v.0))
        }
        TypeCategory::UuidArray => decode_array::<sqlx::types::Uuid>(row, idx, |v| {
            JsonValue::String(v.hyphenated().to_string())
        }),
        TypeCategory::JsonArray => decode_array::<JsonValue>(row, idx, |v| v),
        TypeCategory::Text | TypeCategory::Unknown => {
            decode_as::<String>(row, idx, JsonValue::String)
        }
    }
}

/// Types without a decoder of their own.
///
/// Enum labels and XML travel as text even in binary format; anything else is
/// reported and returned as `null`.
fn decode_unknown(row: &PgRow, idx: usize, type_info: &PgTypeInfo) -> JsonValue {
    let textual = matches!(type_info.kind(), PgTypeKind::Enum(_))
        || type_info.name().eq_ignore_ascii_case("XML");
    if textual {
        return match row.try_get_unchecked::<Option<String>, _>(idx) {
            Ok(v) => v.map(JsonValue::String).unwrap_or(JsonValue::Null),
            Err(e) => {
                tracing::warn!(
                    column = idx,
                    pg_type = type_info.name(),
                    error = %e,
                    "Column not decodable, returning null"
                );
                JsonValue::Null
            }
        };
    }

    match row.try_get_raw(idx) {
        Ok(raw) if raw.is_null() => JsonValue::Null,
        _ => {
            tracing::warn!(
                column = idx,
                pg_type = type_info.name(),
                "Unsupported column type, returning null"
            );
            JsonValue::Null
        }
    }
}

/// Decode a nullable column as `T`, mapping failures to `null`.
fn decode_as<T>(row: &PgRow, idx: usize, to_json: impl FnOnce(T) -> JsonValue) -> JsonValue
where
    T: for<'r> Decode<'r, Postgres> + Type<Postgres>,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(Some(v)) => to_json(v),
        Ok(None) => JsonValue::Null,
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "Column not decodable, returning null");
            JsonValue::Null
        }
    }
}

/// Decode a one-dimensional array with nullable elements.
fn decode_array<T>(row: &PgRow, idx: usize, to_json: impl Fn(T) -> JsonValue) -> JsonValue
where
    T: for<'r> Decode<'r, Postgres> + Type<Postgres> + PgHasArrayType,
{
    decode_as::<Vec<Option<T>>>(row, idx, |v| {
        JsonValue::Array(
            v.into_iter()
                .map(|item| item.map(&to_json).unwrap_or(JsonValue::Null))
                .collect(),
        )
    })
}

fn float_json(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or_else(|| JsonValue::String(v.to_string()))
}

fn decode_float(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v.map(float_json).unwrap_or(JsonValue::Null);
    }
    decode_as::<f32>(row, idx, |v| float_json(v as f64))
}

fn decode_float_array(row: &PgRow, idx: usize) -> JsonValue {
    if let Ok(v) = row.try_get::<Option<Vec<Option<f64>>>, _>(idx) {
        return v
            .map(|v| {
                JsonValue::Array(
                    v.into_iter()
                        .map(|n| n.map(float_json).unwrap_or(JsonValue::Null))
                        .collect(),
                )
            })
            .unwrap_or(JsonValue::Null);
    }
    decode_array::<f32>(row, idx, |v| float_json(v as f64))
}

fn decode_integer_array(row: &PgRow, idx: usize) -> JsonValue {
    let to_array = |v: Vec<Option<i64>>| {
        JsonValue::Array(
            v.into_iter()
                .map(|n| n.map(|n| JsonValue::Number(n.into())).unwrap_or(JsonValue::Null))
                .collect(),
        )
    };
    if let Ok(v) = row.try_get::<Option<Vec<Option<i64>>>, _>(idx) {
        return v.map(to_array).unwrap_or(JsonValue::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<Option<i32>>>, _>(idx) {
        return v
            .map(|v| to_array(v.into_iter().map(|n| n.map(i64::from)).collect()))
            .unwrap_or(JsonValue::Null);
    }
    decode_as::<Vec<Option<i16>>>(row, idx, |v| {
        to_array(v.into_iter().map(|n| n.map(i64::from)).collect())
    })
}

/// Ranges render in PostgreSQL's own text form, e.g. `[1,3)`.
fn decode_range(row: &PgRow, idx: usize) -> JsonValue {
    fn text<T: std::fmt::Display>(range: Option<PgRange<T>>) -> JsonValue {
        range
            .map(|r| JsonValue::String(r.to_string()))
            .unwrap_or(JsonValue::Null)
    }

    if let Ok(v) = row.try_get::<Option<PgRange<i32>>, _>(idx) {
        return text(v);
    }
    if let Ok(v) = row.try_get::<Option<PgRange<i64>>, _>(idx) {
        return text(v);
    }
    if let Ok(v) = row.try_get::<Option<PgRange<chrono::NaiveDate>>, _>(idx) {
        return text(v);
    }
    if let Ok(v) = row.try_get::<Option<PgRange<chrono::NaiveDateTime>>, _>(idx) {
        return text(v);
    }
    if let Ok(v) = row.try_get::<Option<PgRange<chrono::DateTime<chrono::Utc>>>, _>(idx) {
        return text(v);
    }
    decode_as::<PgRange<BigDecimal>>(row, idx, |r| {
        let bound = |b: std::ops::Bound<BigDecimal>| b.map(|d| d.normalized().to_plain_string());
        JsonValue::String(
            PgRange {
                start: bound(r.start),
                end: bound(r.end),
            }
            .to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INT2"), TypeCategory::SmallInt);
        assert_eq!(categorize_type("INT4"), TypeCategory::Integer);
        assert_eq!(categorize_type("int8"), TypeCategory::BigInt);
        assert_eq!(categorize_type("OID"), TypeCategory::Oid);
    }

    #[test]
    fn test_categorize_type_decimal() {
        assert_eq!(categorize_type("NUMERIC"), TypeCategory::Decimal);
        assert_eq!(categorize_type("FLOAT8"), TypeCategory::Float);
    }

    #[test]
    fn test_categorize_type_json() {
        assert_eq!(categorize_type("JSON"), TypeCategory::Json);
        assert_eq!(categorize_type("jsonb"), TypeCategory::Json);
    }

    #[test]
    fn test_categorize_type_temporal_and_arrays() {
        assert_eq!(categorize_type("TIMESTAMPTZ"), TypeCategory::TimestampTz);
        assert_eq!(categorize_type("DATE"), TypeCategory::Date);
        assert_eq!(categorize_type("NAME[]"), TypeCategory::TextArray);
        assert_eq!(categorize_type("CHAR[]"), TypeCategory::TextArray);
        assert_eq!(categorize_type("INT4[]"), TypeCategory::IntegerArray);
        assert_eq!(categorize_type("NAME"), TypeCategory::Text);
    }

    #[test]
    fn test_categorize_type_extended() {
        assert_eq!(categorize_type("INTERVAL"), TypeCategory::Interval);
        assert_eq!(categorize_type("TIMETZ"), TypeCategory::TimeTz);
        assert_eq!(categorize_type("INET"), TypeCategory::Inet);
        assert_eq!(categorize_type("CIDR"), TypeCategory::Cidr);
        assert_eq!(categorize_type("\"CHAR\""), TypeCategory::Char);
        assert_eq!(categorize_type("CHAR"), TypeCategory::Text);
        assert_eq!(categorize_type("INT4RANGE"), TypeCategory::Range);
        assert_eq!(categorize_type("tstzrange"), TypeCategory::Range);
        assert_eq!(categorize_type("BOOL[]"), TypeCategory::BoolArray);
        assert_eq!(categorize_type("FLOAT8[]"), TypeCategory::FloatArray);
        assert_eq!(categorize_type("NUMERIC[]"), TypeCategory::NumericArray);
        assert_eq!(categorize_type("UUID[]"), TypeCategory::UuidArray);
        assert_eq!(categorize_type("JSONB[]"), TypeCategory::JsonArray);
        assert_eq!(categorize_type("MACADDR"), TypeCategory::Unknown);
    }

    fn numeric_header_bytes(sign: u16, dscale: u16) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&0i16.to_be_bytes());
        out.extend_from_slice(&sign.to_be_bytes());
        out.extend_from_slice(&dscale.to_be_bytes());
        out
    }

    #[test]
    fn test_numeric_special_values() {
        for (sign, expected) in [
            (NUMERIC_NAN, "NaN"),
            (NUMERIC_PINF, "Infinity"),
            (NUMERIC_NINF, "-Infinity"),
        ] {
            let (parsed, _) = numeric_header(&numeric_header_bytes(sign, 0)).unwrap();
            assert_eq!(numeric_special(parsed), Some(expected));
        }

        let (sign, dscale) = numeric_header(&numeric_header_bytes(0x4000, 3)).unwrap();
        assert_eq!(numeric_special(sign), None);
        assert_eq!(dscale, 3);
    }

    #[test]
    fn test_numeric_header_truncated() {
        assert!(numeric_header(&[0, 1]).is_err());
        assert!(numeric_header(&numeric_header_bytes(0, 0)[..7]).is_err());
    }

    #[test]
    fn test_decimal_keeps_display_scale() {
        // The binary decoder yields a scale in whole base-10000 groups
        let decimal: BigDecimal = "1.5000".parse().unwrap();
        assert_eq!(decimal.with_scale(2).to_plain_string(), "1.50");

        let tiny: BigDecimal = "0.00000010".parse().unwrap();
        assert_eq!(tiny.with_scale(7).to_plain_string(), "0.0000001");

        let large: BigDecimal = "1E+8".parse().unwrap();
        assert_eq!(large.with_scale(0).to_plain_string(), "100000000");
    }

    #[test]
    fn test_interval_to_iso8601() {
        let iv = |months, days, microseconds| PgInterval {
            months,
            days,
            microseconds,
        };
        assert_eq!(interval_to_iso8601(&iv(0, 1, 0)), "P1D");
        assert_eq!(interval_to_iso8601(&iv(0, 0, 0)), "PT0S");
        assert_eq!(
            interval_to_iso8601(&iv(14, 3, 4 * 3_600_000_000 + 5 * 60_000_000 + 6_500_000)),
            "P1Y2M3DT4H5M6.5S"
        );
        assert_eq!(interval_to_iso8601(&iv(0, 0, -1_500_000)), "PT-1.5S");
        assert_eq!(interval_to_iso8601(&iv(0, 0, -250_000)), "PT-0.25S");
        assert_eq!(interval_to_iso8601(&iv(-1, 0, 0)), "P-1M");
    }

    #[test]
    fn test_inet_host_omits_full_prefix() {
        let host: IpNetwork = "10.0.0.1/32".parse().unwrap();
        assert_eq!(inet_to_string(&host), "10.0.0.1");

        let net: IpNetwork = "10.0.0.0/8".parse().unwrap();
        assert_eq!(inet_to_string(&net), "10.0.0.0/8");

        let v6: IpNetwork = "::1/128".parse().unwrap();
        assert_eq!(inet_to_string(&v6), "::1");
    }

    #[test]
    fn test_decode_binary_value_with_valid_utf8() {
        let result = decode_binary_value(b"hello world");
        assert_eq!(result, JsonValue::String("hello world".to_string()));
    }

    #[test]
    fn test_decode_binary_value_with_invalid_utf8() {
        let bytes: &[u8] = &[0xFF, 0xFE, 0x00, 0x01];
        assert_eq!(
            decode_binary_value(bytes),
            JsonValue::String("//4AAQ==".to_string())
        );
    }
}
