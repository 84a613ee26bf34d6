//! Uploaded files and format dispatch into polars [`DataFrame`]s

use crate::{ProfileError, Result};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Cells treated as missing when reading CSV. Empty fields are always missing.
const NA_VALUES: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

/// Suffix appended to the upload's base name for the report artifact.
pub const REPORT_SUFFIX: &str = "_report.html";

/// Formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub const ACCEPTED: [FileFormat; 2] = [FileFormat::Csv, FileFormat::Json];

    /// Dispatch on the file name suffix (ASCII case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ACCEPTED
            .into_iter()
            .find(|format| lower.ends_with(format.extension()))
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => ".csv",
            FileFormat::Json => ".json",
        }
    }
}

/// A file handed over by a front-end: its declared name and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, content })
    }

    pub fn format(&self) -> Option<FileFormat> {
        FileFormat::from_file_name(&self.name)
    }

    /// File name without directories and without its last extension.
    pub fn base_name(&self) -> String {
        let file_name = self.name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();
        let stem = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.is_empty() || stem == "." || stem == ".." {
            "upload".to_string()
        } else {
            stem
        }
    }

    pub fn report_file_name(&self) -> String {
        format!("{}{}", self.base_name(), REPORT_SUFFIX)
    }
}

/// Parse an uploaded file into a data frame, dispatching on its extension.
pub fn load(file: &UploadedFile) -> Result<DataFrame> {
    let format = file.format().ok_or_else(|| ProfileError::UnsupportedFormat {
        file_name: file.name.clone(),
    })?;
    debug!("Loading {} as {:?} ({} bytes)", file.name, format, file.content.len());

    let df = match format {
        FileFormat::Csv => load_csv(&file.content)?,
        FileFormat::Json => load_json(&file.content)?,
    };

    info!("Loaded {}: {} rows x {} columns", file.name, df.height(), df.width());
    Ok(df)
}

/// Read comma-separated content with a header row, inferring column types
/// over the whole file.
pub fn load_csv(content: &[u8]) -> Result<DataFrame> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    let headers = header_names(content)?;

    let null_values = NA_VALUES.iter().map(|v| PlSmallStr::from(*v)).collect();
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .into_reader_with_file_handle(Cursor::new(content))
        .finish()?;

    if headers.len() == df.width() {
        df.set_column_names(headers.iter().map(String::as_str))?;
    }
    Ok(df)
}

/// Header row with blank names replaced by `Unnamed: <i>` and repeated names
/// suffixed `.1`, `.2`, ... in order of appearance.
fn header_names(content: &[u8]) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let mut names: Vec<String> = Vec::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();
    for (i, raw) in reader.headers()?.iter().enumerate() {
        let base = if raw.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            raw.to_string()
        };
        let mut name = base.clone();
        while names.contains(&name) {
            let n = repeats.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{}.{}", base, n);
        }
        names.push(name);
    }
    Ok(names)
}

/// Read a table-shaped JSON document.
///
/// A top-level array is a list of records. A top-level object is either the
/// split layout (`columns` plus `data` rows, every row an array) or maps each
/// column name to its values, given as an array or as an object keyed by row
/// label.
pub fn load_json(content: &[u8]) -> Result<DataFrame> {
    let first = content.iter().find(|b| !b.is_ascii_whitespace());
    let records = match first {
        Some(b'[') => return read_records(content),
        Some(b'{') => {
            let document: Map<String, Value> = serde_json::from_slice(content)
                .map_err(|e| ProfileError::MalformedInput(format!("invalid JSON: {}", e)))?;
            if is_split(&document) {
                split_records(&document)?
            } else {
                column_records(&document)?
            }
        }
        _ => {
            return Err(ProfileError::MalformedInput(
                "JSON document is not table-shaped".into(),
            ))
        }
    };
    read_records(&serde_json::to_vec(&Value::Array(records))?)
}

fn read_records(content: &[u8]) -> Result<DataFrame> {
    Ok(JsonReader::new(Cursor::new(content)).finish()?)
}

fn is_split(document: &Map<String, Value>) -> bool {
    match (document.get("columns"), document.get("data")) {
        (Some(Value::Array(_)), Some(Value::Array(rows))) => rows.iter().all(Value::is_array),
        _ => false,
    }
}

fn json_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn split_records(document: &Map<String, Value>) -> Result<Vec<Value>> {
    let names: Vec<String> = document
        .get("columns")
        .and_then(Value::as_array)
        .map(|columns| columns.iter().map(json_key).collect())
        .unwrap_or_default();
    let rows = document
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    rows.iter()
        .filter_map(Value::as_array)
        .map(|row| {
            if row.len() > names.len() {
                return Err(ProfileError::MalformedInput(format!(
                    "row has {} values but only {} columns are named",
                    row.len(),
                    names.len()
                )));
            }
            let record: Map<String, Value> = names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or(Value::Null)))
                .collect();
            Ok(Value::Object(record))
        })
        .collect()
}

/// Rows of a column-per-key document. Array columns are positional and must
/// share one length; object columns are aligned on the union of their labels.
fn column_records(document: &Map<String, Value>) -> Result<Vec<Value>> {
    let mut labels: Vec<String> = Vec::new();
    let mut length: Option<usize> = None;
    for (name, cells) in document {
        match cells {
            Value::Array(items) => match length {
                Some(expected) if expected != items.len() => {
                    return Err(ProfileError::MalformedInput(format!(
                        "column '{}' has {} values, expected {}",
                        name,
                        items.len(),
                        expected
                    )))
                }
                _ => length = Some(items.len()),
            },
            Value::Object(cells) => {
                for label in cells.keys() {
                    if !labels.contains(label) {
                        labels.push(label.clone());
                    }
                }
            }
            _ => {
                return Err(ProfileError::MalformedInput(format!(
                    "column '{}' is neither an array nor an object",
                    name
                )))
            }
        }
    }

    let height = match length {
        Some(n) if !labels.is_empty() && n != labels.len() => {
            return Err(ProfileError::MalformedInput(
                "array and object columns disagree on the row count".into(),
            ))
        }
        Some(n) => n,
        None => labels.len(),
    };

    Ok((0..height)
        .map(|i| {
            let record: Map<String, Value> = document
                .iter()
                .map(|(name, cells)| {
                    let cell = match cells {
                        Value::Array(items) => items.get(i),
                        Value::Object(cells) => labels.get(i).and_then(|label| cells.get(label)),
                        _ => None,
                    };
                    (name.clone(), cell.cloned().unwrap_or(Value::Null))
                })
                .collect();
            Value::Object(record)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{column_names, rows_text};

    fn column_text(df: &DataFrame, name: &str) -> Vec<String> {
        let column = df.column(name).unwrap();
        (0..column.len())
            .map(|i| crate::frame::cell_text(&column.get(i).unwrap()))
            .collect()
    }

    #[test]
    fn test_format_dispatch() {
        assert_eq!(FileFormat::from_file_name("data.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_file_name("DATA.JSON"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_file_name("notes.txt"), None);
        assert_eq!(FileFormat::from_file_name("csv"), None);
    }

    #[test]
    fn test_base_name_strips_last_extension_and_directories() {
        assert_eq!(UploadedFile::new("data.csv", "").base_name(), "data");
        assert_eq!(UploadedFile::new("archive.v2.json", "").base_name(), "archive.v2");
        assert_eq!(UploadedFile::new("../../etc/x.csv", "").base_name(), "x");
        assert_eq!(UploadedFile::new("C:\\up\\y.csv", "").base_name(), "y");
        assert_eq!(UploadedFile::new("", "").base_name(), "upload");
        assert_eq!(
            UploadedFile::new("data.csv", "").report_file_name(),
            "data_report.html"
        );
    }

    #[test]
    fn test_csv_column_typing() {
        let df = load_csv(b"id,score,flag,name\n1,1.5,true,ann\n2,,false,NA\n3,2,true,bob\n")
            .unwrap();
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("score").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("flag").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);

        assert_eq!(column_text(&df, "score"), vec!["1.5", "NaN", "2.0"]);
        assert_eq!(column_text(&df, "name"), vec!["ann", "NaN", "bob"]);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_csv_extra_fields_are_malformed() {
        let err = load_csv(b"a,b\n1,2\n3,4,5\n").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::MalformedInput);
    }

    #[test]
    fn test_csv_bom_and_unnamed_header() {
        let df = load_csv(b"\xEF\xBB\xBFa,\n1,2\n").unwrap();
        assert_eq!(column_names(&df), vec!["a", "Unnamed: 1"]);
    }

    #[test]
    fn test_csv_repeated_headers_are_numbered() {
        let df = load(&UploadedFile::new("d.csv", "a,a\n1,2\n")).unwrap();
        assert_eq!(df.width(), 2);
        assert_eq!(column_names(&df), vec!["a", "a.1"]);
        assert_eq!(rows_text(&df).unwrap(), vec![vec!["1", "2"]]);

        let df = load_csv(b"x,y,x,x\n1,2,3,4\n").unwrap();
        assert_eq!(column_names(&df), vec!["x", "y", "x.1", "x.2"]);
    }

    #[test]
    fn test_csv_header_only_has_no_rows() {
        let df = load_csv(b"a,b\n").unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn test_json_records_union_of_keys() {
        let df = load_json(br#"[{"a": 1, "b": "x"}, {"a": 2, "c": true}]"#).unwrap();
        assert_eq!(column_names(&df), vec!["a", "b", "c"]);
        assert_eq!(column_text(&df, "b"), vec!["x", "NaN"]);
        assert_eq!(column_text(&df, "c"), vec!["NaN", "True"]);
    }

    #[test]
    fn test_json_column_orient() {
        let df = load_json(br#"{"a": {"0": 1, "1": 2}, "b": {"0": "x", "1": "y"}}"#).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(column_text(&df, "b"), vec!["x", "y"]);
    }

    #[test]
    fn test_json_columnar_and_split() {
        let columnar = load_json(br#"{"a": [1, 2, 3], "b": [0.5, null, 1.5]}"#).unwrap();
        assert_eq!(columnar.height(), 3);
        assert_eq!(columnar.column("b").unwrap().null_count(), 1);

        let split =
            load_json(br#"{"columns": ["x", "y"], "index": [0, 1], "data": [[1, "a"], [2, "b"]]}"#)
                .unwrap();
        assert_eq!(column_names(&split), vec!["x", "y"]);
        assert_eq!(rows_text(&split).unwrap()[1], vec!["2", "b"]);
    }

    #[test]
    fn test_json_columns_and_data_keys_without_row_arrays_are_columns() {
        let df = load_json(br#"{"columns": ["x", "y"], "data": [1, 2]}"#).unwrap();
        assert_eq!(column_names(&df), vec!["columns", "data"]);
        assert_eq!(df.height(), 2);
        assert_eq!(column_text(&df, "columns"), vec!["x", "y"]);
        assert_eq!(column_text(&df, "data"), vec!["1", "2"]);
    }

    #[test]
    fn test_json_split_row_wider_than_columns_rejected() {
        let err = load_json(br#"{"columns": ["x"], "data": [[1, 2]]}"#).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput(_)));
    }

    #[test]
    fn test_json_columnar_unequal_lengths_rejected() {
        let err = load_json(br#"{"a": [1, 2], "b": [1]}"#).unwrap_err();
        assert!(matches!(err, ProfileError::MalformedInput(_)));
    }

    #[test]
    fn test_json_scalar_rejected() {
        assert!(matches!(
            load_json(b"42").unwrap_err(),
            ProfileError::MalformedInput(_)
        ));
        assert!(matches!(
            load_json(b"{not json").unwrap_err(),
            ProfileError::MalformedInput(_)
        ));
        assert!(matches!(
            load_json(br#"{"a": 1}"#).unwrap_err(),
            ProfileError::MalformedInput(_)
        ));
    }

    #[test]
    fn test_unsupported_extension_is_not_parsed() {
        let file = UploadedFile::new("notes.txt", "a,b\n1,2\n");
        let err = load(&file).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format");
    }
}
