//! Named tables and their CSV interchange files.
//!
//! A table is read once during export and written to `__data_<name>.csv`
//! inside the per-call scratch directory; the generated script loads it back
//! under the same name with `read.csv`.

use std::fmt;
use std::path::Path;

use crate::error::GgError;
use crate::script;

/// A single table value. `Null` serializes as `NA` so R reads it as missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            // R's type.convert recognizes the uppercase spellings as logical.
            Cell::Bool(true) => f.write_str("TRUE"),
            Cell::Bool(false) => f.write_str("FALSE"),
            Cell::Str(s) => f.write_str(s),
            Cell::Null => f.write_str("NA"),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Str(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Str(v)
    }
}

/// A rectangular, row-major dataset with named columns.
///
/// # Examples
///
/// ```
/// use ggshow::{Cell, Table};
///
/// let mut t = Table::new(["x", "y"]);
/// t.push_row(vec![Cell::Int(1), Cell::Float(0.5)]).unwrap();
/// assert_eq!(t.n_rows(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append one row; it must be exactly as wide as the header.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), GgError> {
        if row.len() != self.columns.len() {
            return Err(GgError::RaggedRow {
                row: self.rows.len(),
                got: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Cell>>) -> Result<Self, GgError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Serialize as UTF-8 CSV, header row first.
    pub fn write_csv(&self, path: &Path) -> Result<(), GgError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Cell::to_string))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Export every named table into `dir` and return the R statements that load
/// them back under their caller-visible names, in caller order.
pub(crate) fn export_tables(
    dir: &Path,
    tables: &[(String, Table)],
) -> Result<Vec<String>, GgError> {
    let mut loads = Vec::with_capacity(tables.len());
    for (name, table) in tables {
        if !is_r_identifier(name) {
            return Err(GgError::BadTableName(name.clone()));
        }
        let file = dir.join(format!("__data_{name}.csv"));
        table.write_csv(&file)?;
        loads.push(format!(
            "{name} <- read.csv({path}, as.is=TRUE)",
            path = script::r_string(&script::path_for_r(&file)),
        ));
    }
    Ok(loads)
}

// Close enough to R's identifier rules for a data frame name; anything
// fancier would need backticks in the generated script.
fn is_r_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '.')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}
