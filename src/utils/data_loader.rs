//! Data loading utilities

use crate::error::{DiabetesError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Tabular file formats understood by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    JsonLines,
    Parquet,
    /// `.xls` or `.xlsx` workbook; the first sheet is read
    Excel,
}

impl FileFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();

        match ext.as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "json" => Some(FileFormat::Json),
            "jsonl" | "ndjson" => Some(FileFormat::JsonLines),
            "parquet" | "pq" => Some(FileFormat::Parquet),
            "xls" | "xlsx" | "xlsm" => Some(FileFormat::Excel),
            _ => None,
        }
    }
}

/// Data loader for the supported file formats
pub struct DataLoader {
    /// Rows used for CSV schema inference
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set the number of rows used for CSV schema inference
    pub fn with_infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a delimited text file with a header row
    pub fn load_csv(&self, path: &Path, delimiter: u8) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            DiabetesError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| DiabetesError::DataError(e.to_string()))
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            DiabetesError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        ParquetReader::new(file)
            .finish()
            .map_err(|e| DiabetesError::DataError(e.to_string()))
    }

    /// Load a JSON file, either an array of records or one record per line
    pub fn load_json(&self, path: &Path, lines: bool) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            DiabetesError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let format = if lines { JsonFormat::JsonLines } else { JsonFormat::Json };

        JsonReader::new(file)
            .with_json_format(format)
            .finish()
            .map_err(|e| DiabetesError::DataError(e.to_string()))
    }

    /// Load the first worksheet of an Excel workbook; the first row holds
    /// the column names
    pub fn load_excel(&self, path: &Path) -> Result<DataFrame> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            DiabetesError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| {
                DiabetesError::DataError(format!("{} has no worksheets", path.display()))
            })?
            .map_err(|e| DiabetesError::DataError(e.to_string()))?;

        sheet_to_frame(&range)
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let format = FileFormat::from_path(path).ok_or_else(|| {
            DiabetesError::DataError(format!(
                "unsupported file format: {} (expected csv, tsv, json, jsonl, parquet, xls or xlsx)",
                path.display()
            ))
        })?;

        let df = match format {
            FileFormat::Csv => self.load_csv(path, b',')?,
            FileFormat::Tsv => self.load_csv(path, b'\t')?,
            FileFormat::Json => self.load_json(path, false)?,
            FileFormat::JsonLines => self.load_json(path, true)?,
            FileFormat::Parquet => self.load_parquet(path)?,
            FileFormat::Excel => self.load_excel(path)?,
        };

        debug!(
            path = %path.display(),
            format = ?format,
            rows = df.height(),
            columns = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );

        Ok(df)
    }
}

/// Stands in for cells past the end of a short row
static EMPTY_CELL: Data = Data::Empty;

/// Build a frame from a worksheet. Columns whose non-empty cells are all
/// numbers (or numeric text) become `Float64`, the rest stay text.
fn sheet_to_frame(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DiabetesError::DataError("worksheet is empty".to_string()))?;
    let body: Vec<&[Data]> = rows.collect();

    let columns = header
        .iter()
        .enumerate()
        .map(|(j, cell)| {
            let name = cell.to_string();
            let cells = || body.iter().map(move |row| row.get(j).unwrap_or(&EMPTY_CELL));

            let numeric: Option<Vec<Option<f64>>> = cells().map(numeric_cell).collect();
            let series = match numeric {
                Some(values) => Series::new(name.trim().into(), values),
                None => {
                    let text: Vec<Option<String>> = cells()
                        .map(|c| match c {
                            Data::Empty => None,
                            other => Some(other.to_string()),
                        })
                        .collect();
                    Series::new(name.trim().into(), text)
                }
            };
            Column::from(series)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// `Some(None)` for a blank cell, `None` when the cell is not numeric
fn numeric_cell(cell: &Data) -> Option<Option<f64>> {
    match cell {
        Data::Empty => Some(None),
        Data::Int(v) => Some(Some(*v as f64)),
        Data::Float(v) => Some(Some(*v)),
        Data::String(s) if s.trim().is_empty() => Some(None),
        Data::String(s) => s.trim().parse::<f64>().ok().map(Some),
        _ => None,
    }
}

/// Save DataFrame to CSV
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(|e| {
            DiabetesError::DataError(format!("cannot create {}: {}", path.display(), e))
        })?;

        CsvWriter::new(&mut file)
            .finish(df)
            .map_err(|e| DiabetesError::DataError(e.to_string()))
    }
}
