//! Text and JSON views of loaded data frames

use polars::prelude::*;
use serde_json::{json, Value};

/// Display form of a cell: missing values read `NaN`, integral floats keep a
/// trailing `.0`, booleans are capitalised.
pub fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "NaN".to_string(),
        AnyValue::Boolean(b) => String::from(if *b { "True" } else { "False" }),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float32(v) => float_text(*v as f64),
        AnyValue::Float64(v) => float_text(*v),
        other => other.to_string(),
    }
}

fn float_text(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// JSON form of a cell. Non-finite floats become `null`.
pub fn cell_json(value: &AnyValue) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => serde_json::Number::from_f64(*v as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        other => Value::String(other.to_string()),
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Apply `f` to every cell, row by row.
fn map_rows<T>(df: &DataFrame, f: impl Fn(&AnyValue) -> T) -> PolarsResult<Vec<Vec<T>>> {
    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut row = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            row.push(f(&column.get(i)?));
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn rows_text(df: &DataFrame) -> PolarsResult<Vec<Vec<String>>> {
    map_rows(df, cell_text)
}

/// Split orientation: `{"columns": [...], "data": [[...], ...]}`.
pub fn to_split_json(df: &DataFrame) -> PolarsResult<Value> {
    let data: Vec<Value> = map_rows(df, cell_json)?
        .into_iter()
        .map(Value::Array)
        .collect();
    Ok(json!({
        "columns": column_names(df),
        "data": data,
    }))
}
