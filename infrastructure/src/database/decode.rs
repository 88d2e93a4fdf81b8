//! Row cell decoding into [`CellValue`].
//!
//! Decoding is driven by the type name the driver reports for each value.
//! Anything without a natural mapping falls back to text, then to an opaque
//! `<type>` marker.

use dbchat_domain::CellValue;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;
use sqlx::types::{BigDecimal, Uuid};
use sqlx::{Row, TypeInfo, ValueRef};

/// Null check plus the upper-cased type name, or `None` for NULL.
macro_rules! type_name {
    ($row:expr, $index:expr) => {{
        match $row.try_get_raw($index) {
            Ok(raw) if raw.is_null() => None,
            Ok(raw) => Some(raw.type_info().name().to_ascii_uppercase()),
            Err(_) => None,
        }
    }};
}

pub(crate) fn sqlite_cell(row: &SqliteRow, index: usize) -> CellValue {
    let Some(ty) = type_name!(row, index) else {
        return CellValue::Null;
    };
    match ty.as_str() {
        "INTEGER" | "INT" | "BIGINT" => row.try_get::<i64, _>(index).map(CellValue::Integer),
        "BOOLEAN" => row.try_get::<bool, _>(index).map(CellValue::Bool),
        "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => {
            row.try_get::<f64, _>(index).map(CellValue::Float)
        }
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(bytes_cell),
        _ => row.try_get::<String, _>(index).map(CellValue::Text),
    }
    .unwrap_or_else(|_| opaque(&ty))
}

pub(crate) fn postgres_cell(row: &PgRow, index: usize) -> CellValue {
    let Some(ty) = type_name!(row, index) else {
        return CellValue::Null;
    };
    match ty.as_str() {
        "BOOL" => row.try_get::<bool, _>(index).map(CellValue::Bool),
        "INT2" => row.try_get::<i16, _>(index).map(|v| CellValue::Integer(v.into())),
        "INT4" => row.try_get::<i32, _>(index).map(|v| CellValue::Integer(v.into())),
        "INT8" => row.try_get::<i64, _>(index).map(CellValue::Integer),
        "FLOAT4" => row.try_get::<f32, _>(index).map(|v| CellValue::Float(v.into())),
        "FLOAT8" => row.try_get::<f64, _>(index).map(CellValue::Float),
        "NUMERIC" => row
            .try_get::<BigDecimal, _>(index)
            .map(|v| decimal_cell(v.to_string())),
        "DATE" => row
            .try_get::<chrono::NaiveDate, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "TIME" => row
            .try_get::<chrono::NaiveTime, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "TIMESTAMP" => row
            .try_get::<chrono::NaiveDateTime, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "TIMESTAMPTZ" => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(index)
            .map(|v| CellValue::Text(v.to_rfc3339())),
        "UUID" => row
            .try_get::<Uuid, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "JSON" | "JSONB" => row
            .try_get::<serde_json::Value, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "BYTEA" => row.try_get::<Vec<u8>, _>(index).map(bytes_cell),
        _ => row.try_get::<String, _>(index).map(CellValue::Text),
    }
    .unwrap_or_else(|_| opaque(&ty))
}

pub(crate) fn mysql_cell(row: &MySqlRow, index: usize) -> CellValue {
    let Some(ty) = type_name!(row, index) else {
        return CellValue::Null;
    };
    let base = ty.split_whitespace().next().unwrap_or_default();
    match base {
        "BOOLEAN" => row.try_get::<bool, _>(index).map(CellValue::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => row
            .try_get::<i64, _>(index)
            .map(CellValue::Integer)
            .or_else(|_| row.try_get::<u64, _>(index).map(unsigned_cell)),
        "FLOAT" => row.try_get::<f32, _>(index).map(|v| CellValue::Float(v.into())),
        "DOUBLE" => row.try_get::<f64, _>(index).map(CellValue::Float),
        "DECIMAL" => row
            .try_get::<BigDecimal, _>(index)
            .map(|v| decimal_cell(v.to_string())),
        "DATE" => row
            .try_get::<chrono::NaiveDate, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "TIME" => row
            .try_get::<chrono::NaiveTime, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "DATETIME" => row
            .try_get::<chrono::NaiveDateTime, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "TIMESTAMP" => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(index)
            .map(|v| CellValue::Text(v.to_rfc3339())),
        "JSON" => row
            .try_get::<serde_json::Value, _>(index)
            .map(|v| CellValue::Text(v.to_string())),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            row.try_get::<Vec<u8>, _>(index).map(bytes_cell)
        }
        _ => row
            .try_get::<String, _>(index)
            .map(CellValue::Text)
            .or_else(|_| row.try_get::<Vec<u8>, _>(index).map(bytes_cell)),
    }
    .unwrap_or_else(|_| opaque(&ty))
}

fn unsigned_cell(value: u64) -> CellValue {
    i64::try_from(value)
        .map(CellValue::Integer)
        .unwrap_or(CellValue::Float(value as f64))
}

/// Exact decimals become floats when they parse, text otherwise.
fn decimal_cell(text: String) -> CellValue {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => CellValue::Float(value),
        _ => CellValue::Text(text),
    }
}

fn bytes_cell(bytes: Vec<u8>) -> CellValue {
    match String::from_utf8(bytes) {
        Ok(text) => CellValue::Text(text),
        Err(e) => CellValue::Text(format!("<{} bytes>", e.as_bytes().len())),
    }
}

fn opaque(type_name: &str) -> CellValue {
    CellValue::Text(format!("<{}>", type_name.to_ascii_lowercase()))
}
