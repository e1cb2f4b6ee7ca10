use csv::{ReaderBuilder, Trim};
use ndarray::Array2;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while loading a CSV file or reading columns out of it.
#[derive(Debug, Error)]
pub enum TableError {
    /// The file could not be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The CSV reader rejected the input (bad UTF-8, I/O failure, ...).
    #[error("{0}")]
    Csv(#[from] csv::Error),
    /// The input had no header row.
    #[error("No columns to parse from file")]
    NoColumns,
    /// A data row carried more fields than the header.
    #[error("Expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error("Column '{0}' not found")]
    UnknownColumn(String),
    /// Rows are reported 1-based, counting data rows only.
    #[error("Column '{column}' has a missing value in row {row}")]
    MissingValue { column: String, row: usize },
    #[error("could not convert string to float: '{value}' (column '{column}', row {row})")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Column '{column}' contains a non-finite value in row {row}")]
    NotFinite { column: String, row: usize },
}

/// Rows × named columns, parsed from a CSV file whose first row holds the
/// column names. Cells are kept as trimmed text; typed views are produced
/// on demand by the column accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Opens and parses the CSV file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Parses CSV text from any reader.
    ///
    /// Short rows are padded with missing values; long rows are rejected.
    /// Duplicate or blank header names are renamed so every column can be
    /// addressed by name.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let raw_headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        if raw_headers.is_empty() || raw_headers.iter().all(String::is_empty) {
            return Err(TableError::NoColumns);
        }
        let headers = dedupe_headers(raw_headers);
        let expected = headers.len();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if record.len() > expected {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(TableError::RaggedRow {
                    line,
                    expected,
                    found: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(expected, String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
    }

    /// Cells of one column; blank cells are reported as missing.
    fn present_cells(&self, name: &str) -> Result<Vec<&str>, TableError> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cell = row[idx].as_str();
                if cell.is_empty() {
                    Err(TableError::MissingValue {
                        column: name.to_string(),
                        row: i + 1,
                    })
                } else {
                    Ok(cell)
                }
            })
            .collect()
    }

    /// Parses every cell of `name` as a finite `f64`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, TableError> {
        let cells = self.present_cells(name)?;
        cells
            .into_iter()
            .enumerate()
            .map(|(i, cell)| {
                let value: f64 = cell.parse().map_err(|_| TableError::NotNumeric {
                    column: name.to_string(),
                    row: i + 1,
                    value: cell.to_string(),
                })?;
                if value.is_nan() {
                    // "nan" / "NaN" are how dataframes spell a missing cell.
                    return Err(TableError::MissingValue {
                        column: name.to_string(),
                        row: i + 1,
                    });
                }
                if !value.is_finite() {
                    return Err(TableError::NotFinite {
                        column: name.to_string(),
                        row: i + 1,
                    });
                }
                Ok(value)
            })
            .collect()
    }

    /// Class labels of `name`, normalised by the column's inferred type.
    ///
    /// An all-integer column yields canonical integers (`"007"` → `"7"`),
    /// an all-numeric column yields floats with a decimal point (`"1"` →
    /// `"1.0"`), anything else yields the trimmed text.
    pub fn label_column(&self, name: &str) -> Result<Vec<String>, TableError> {
        let cells = self.present_cells(name)?;

        let ints: Option<Vec<i64>> = cells.iter().map(|c| c.parse().ok()).collect();
        if let Some(ints) = ints {
            return Ok(ints.into_iter().map(|v| v.to_string()).collect());
        }

        let floats: Option<Vec<f64>> = cells
            .iter()
            .map(|c| c.parse::<f64>().ok().filter(|v| !v.is_nan()))
            .collect();
        if let Some(floats) = floats {
            return Ok(floats.into_iter().map(|v| format!("{v:?}")).collect());
        }

        Ok(cells.into_iter().map(str::to_string).collect())
    }

    /// `n × 2` record matrix built from two numeric columns.
    pub fn feature_matrix(&self, first: &str, second: &str) -> Result<Array2<f64>, TableError> {
        let xs = self.numeric_column(first)?;
        let ys = self.numeric_column(second)?;
        Ok(Array2::from_shape_fn((xs.len(), 2), |(row, col)| {
            if col == 0 { xs[row] } else { ys[row] }
        }))
    }
}

/// Renames blank headers to `Unnamed: {i}` and repeated headers to
/// `name.1`, `name.2`, ... skipping suffixes that are already taken.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mut col = if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut current = counts.get(&col).copied().unwrap_or(0);
            while current > 0 {
                counts.insert(col.clone(), current + 1);
                col = format!("{col}.{current}");
                current = counts.get(&col).copied().unwrap_or(0);
            }
            counts.insert(col.clone(), current + 1);
            col
        })
        .collect()
}
