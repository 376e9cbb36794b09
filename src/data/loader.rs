use std::collections::BTreeMap;
use std::fs::File;
use std::num::ParseFloatError;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::LoadError;
use super::model::{ColumnSet, Estimate, FundingSource, SpendingRecord, SpendingTable, STUDY_WINDOW};

/// Columns that must be present for the table to be usable at all.
pub const REQUIRED_COLUMNS: [&str; 3] = ["location_name", "year", "the_total_mean"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the spending table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` / `.pq` – columns named as in the IHME CSV export
/// * anything else       – CSV with a header row (the IHME file ships as `.CSV`)
///
/// Only rows inside [`STUDY_WINDOW`] are kept.  Rows with a non-numeric year,
/// a non-numeric value cell or more fields than the header are dropped with a
/// warning.  Location names are kept verbatim.
pub fn load_file(path: &Path) -> Result<SpendingTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut sink = RowSink::default();
    let columns = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, &mut sink)?,
        _ => load_csv(path, &mut sink)?,
    };

    info!(
        "loaded {} rows from {} ({} outside {}-{}, {} dropped as malformed)",
        sink.records.len(),
        path.display(),
        sink.outside_window,
        STUDY_WINDOW.0,
        STUDY_WINDOW.1,
        sink.malformed,
    );
    for (location, year, count) in duplicate_years(&sink.records) {
        warn!("{location} has {count} rows for {year}; using the first one");
    }

    let table = SpendingTable::from_records(sink.records, columns);
    if table.is_empty() {
        warn!("no rows of {} fall inside the study window", path.display());
    }
    debug!("{} rows across {} distinct locations", table.len(), table.locations.len());
    Ok(table)
}

// ---------------------------------------------------------------------------
// Row accumulation shared by both formats
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RowSink {
    records: Vec<SpendingRecord>,
    outside_window: usize,
    malformed: usize,
}

impl RowSink {
    fn accept(&mut self, record: SpendingRecord) {
        if (STUDY_WINDOW.0..=STUDY_WINDOW.1).contains(&record.year) {
            self.records.push(record);
        } else {
            self.outside_window += 1;
        }
    }

    fn reject(&mut self, reason: std::fmt::Arguments<'_>) {
        warn!("skipping {reason}");
        self.malformed += 1;
    }
}

/// `(location, year)` pairs with more than one row.  Statistics take the
/// first row for such a pair.
fn duplicate_years(records: &[SpendingRecord]) -> Vec<(&str, i32, usize)> {
    let mut seen: BTreeMap<(&str, i32), usize> = BTreeMap::new();
    for r in records {
        *seen.entry((r.location_name.as_str(), r.year)).or_default() += 1;
    }
    seen.into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|((location, year), count)| (location, year, count))
        .collect()
}

fn check_required(headers: &[String], path: &Path) -> Result<(), LoadError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header positions of every column the loader reads.
struct CsvIndex {
    location: usize,
    year: usize,
    /// Per series: positions of mean, lower, upper.
    series: Vec<(FundingSource, [Option<usize>; 3])>,
}

impl CsvIndex {
    fn resolve(headers: &[String]) -> Self {
        let pos = |name: &str| headers.iter().position(|h| h == name);
        let series = FundingSource::ALL
            .iter()
            .map(|&s| {
                (
                    s,
                    [
                        pos(&s.mean_column()),
                        pos(&s.lower_column()),
                        pos(&s.upper_column()),
                    ],
                )
            })
            .collect();
        CsvIndex {
            location: pos("location_name").unwrap_or_default(),
            year: pos("year").unwrap_or_default(),
            series,
        }
    }
}

fn load_csv(path: &Path, sink: &mut RowSink) -> Result<ColumnSet, LoadError> {
    // Flexible: a short or long row is a malformed row, not a broken file.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    check_required(&headers, path)?;

    let columns = ColumnSet::from_headers(&headers);
    let index = CsvIndex::resolve(&headers);

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = row_no + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => return Err(e.into()),
            Err(e) => {
                sink.reject(format_args!("line {line}: {e}"));
                continue;
            }
        };
        if row.len() > headers.len() {
            sink.reject(format_args!(
                "line {line}: {} fields but the header has {}",
                row.len(),
                headers.len()
            ));
            continue;
        }

        // Short rows read their missing trailing cells as empty.
        let location = row.get(index.location).unwrap_or("");
        if location.trim().is_empty() {
            sink.reject(format_args!("line {line}: empty location_name"));
            continue;
        }

        let year_cell = row.get(index.year).unwrap_or("");
        let Some(year) = parse_year(year_cell) else {
            sink.reject(format_args!("line {line}: non-numeric year {year_cell:?}"));
            continue;
        };

        let mut record = SpendingRecord::new(location, year);
        let mut bad_cell = None;
        'series: for (source, positions) in &index.series {
            let mut cells = [None; 3];
            for (slot, pos) in cells.iter_mut().zip(positions) {
                let Some(pos) = pos else { continue };
                let raw = row.get(*pos).unwrap_or("");
                match parse_value(raw) {
                    Ok(v) => *slot = v,
                    Err(_) => {
                        bad_cell = Some((headers[*pos].as_str(), raw.to_string()));
                        break 'series;
                    }
                }
            }
            record.set(*source, Estimate::new(cells[0], cells[1], cells[2]));
        }

        if let Some((column, raw)) = bad_cell {
            sink.reject(format_args!("line {line}: non-numeric {column} {raw:?}"));
            continue;
        }
        sink.accept(record);
    }

    Ok(columns)
}

/// Accepts plain integers and integral floats such as `2005.0`.
fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Empty cells and the usual NA spellings are missing values.
fn parse_value(s: &str) -> Result<Option<f64>, ParseFloatError> {
    let s = s.trim();
    if s.is_empty() || ["na", "n/a", "nan", "null", "none"].contains(&s.to_ascii_lowercase().as_str()) {
        return Ok(None);
    }
    s.parse::<f64>().map(Some)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with the same column names as the CSV export.
///
/// `location_name` may be any string-castable type; `year` and the value
/// columns any numeric type.  Works with files written by Pandas or Polars.
fn load_parquet(path: &Path, sink: &mut RowSink) -> Result<ColumnSet, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    check_required(&headers, path)?;
    let columns = ColumnSet::from_headers(&headers);

    let reader = builder.build()?;
    let mut offset = 0usize;

    for batch in reader {
        let batch = batch?;

        let locations = column_as(&batch, "location_name", &DataType::Utf8)?;
        let locations = locations
            .as_string_opt::<i32>()
            .ok_or_else(|| unsupported("location_name", locations.data_type()))?;
        let years = column_as(&batch, "year", &DataType::Float64)?;
        let years = years
            .as_primitive_opt::<Float64Type>()
            .ok_or_else(|| unsupported("year", years.data_type()))?;

        let mut series = Vec::new();
        for source in FundingSource::ALL {
            let mut cols: [Option<ArrayRef>; 3] = [None, None, None];
            let names = [source.mean_column(), source.lower_column(), source.upper_column()];
            for (slot, name) in cols.iter_mut().zip(&names) {
                if batch.schema().index_of(name).is_ok() {
                    *slot = Some(column_as(&batch, name, &DataType::Float64)?);
                }
            }
            series.push((source, cols));
        }

        for row in 0..batch.num_rows() {
            let row_no = offset + row;
            if locations.is_null(row) || locations.value(row).trim().is_empty() {
                sink.reject(format_args!("row {row_no}: empty location_name"));
                continue;
            }
            let year = (!years.is_null(row))
                .then(|| years.value(row))
                .filter(|y| y.is_finite() && y.fract() == 0.0);
            let Some(year) = year else {
                sink.reject(format_args!("row {row_no}: missing or non-integral year"));
                continue;
            };

            let mut record = SpendingRecord::new(locations.value(row), year as i32);
            for (source, cols) in &series {
                let [mean, lower, upper] = cols.each_ref().map(|c| c.as_ref().and_then(|a| f64_at(a, row)));
                record.set(*source, Estimate::new(mean, lower, upper));
            }
            sink.accept(record);
        }
        offset += batch.num_rows();
    }

    Ok(columns)
}

// -- Parquet / Arrow helpers --

/// Fetch a column by name and cast it to `target`.
fn column_as(batch: &RecordBatch, name: &str, target: &DataType) -> Result<ArrayRef, LoadError> {
    let schema = batch.schema();
    let idx = schema.index_of(name)?;
    let col = batch.column(idx);
    if col.data_type() == target {
        return Ok(col.clone());
    }
    if !can_cast_types(col.data_type(), target) {
        return Err(unsupported(name, col.data_type()));
    }
    Ok(cast(col, target)?)
}

fn f64_at(col: &ArrayRef, row: usize) -> Option<f64> {
    let arr = col.as_primitive_opt::<Float64Type>()?;
    if arr.is_null(row) {
        None
    } else {
        Some(arr.value(row))
    }
}

fn unsupported(column: &str, data_type: &DataType) -> LoadError {
    LoadError::UnsupportedColumnType {
        column: column.to_string(),
        data_type: format!("{data_type:?}"),
    }
}
