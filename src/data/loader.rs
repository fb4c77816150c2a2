use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::clean::clean;
use super::model::{Dataset, RawValue};
use crate::error::{LoadError, LoadResult};

// ---------------------------------------------------------------------------
// RawTable – parsed but uncleaned rows
// ---------------------------------------------------------------------------

/// Rows of heterogeneous cells, one `Vec` per row in `headers` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Position of a column, or [`LoadError::MissingColumn`].
    pub fn column_index(&self, name: &str) -> LoadResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and clean a churn dataset.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`            – comma separated, header row
/// * `.tsv` / `.tab`   – tab separated, header row
/// * `.json`           – `[{ "gender": "Female", "tenure": 1, ... }, ...]`
/// * `.parquet` / `.pq`
pub fn load_file(path: &Path) -> LoadResult<Dataset> {
    let table = read_table(path)?;
    log::debug!(
        "Parsed {} rows with columns {:?} from {}",
        table.rows.len(),
        table.headers,
        path.display()
    );
    clean(&table)
}

/// Parse a file into a [`RawTable`] without any cleaning.
pub fn read_table(path: &Path) -> LoadResult<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => read_delimited(open(path)?, b','),
        "tsv" | "tab" => read_delimited(open(path)?, b'\t'),
        "json" => read_json(open(path)?),
        "parquet" | "pq" => read_parquet(open(path)?),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

fn open(path: &Path) -> LoadResult<File> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Header row with column names; every cell is kept as text and typed later.
pub fn read_delimited<R: std::io::Read>(source: R, delimiter: u8) -> LoadResult<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(source);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(text_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

fn text_cell(s: &str) -> RawValue {
    if s.is_empty() {
        RawValue::Null
    } else {
        RawValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`).  Keys missing from
/// a record read as null; the header is the union of keys in first-seen order.
pub fn read_json<R: std::io::Read>(source: R) -> LoadResult<RawTable> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(source))?;
    let records = root.as_array().ok_or(LoadError::NotAnArray)?;

    let mut headers: Vec<String> = Vec::new();
    for (row, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or(LoadError::NotAnObject { row })?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_raw).unwrap_or(RawValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_raw(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        other => RawValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Column types are kept as-is; the
/// cleaning step coerces them.
pub fn read_parquet(file: File) -> LoadResult<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| extract_raw_value(col, row))
                .collect::<LoadResult<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_raw_value(col: &ArrayRef, row: usize) -> LoadResult<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => RawValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RawValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => RawValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => RawValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => RawValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => RawValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => RawValue::Bool(col.as_boolean().value(row)),
        _ => {
            // Dictionaries, small ints, views: fall back to arrow's display.
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(col.as_ref(), &options)?;
            RawValue::Text(formatter.value(row).to_string())
        }
    };
    Ok(value)
}
