//! CSV helpers for DBC and creature_template exports.
//!
//! Exports come from DBC/SQL dump tools, so only the subset of CSV that those
//! tools emit is handled: comma separators, optional quoting, `""` escapes.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Parse a CSV line, handling quoted fields properly.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if !in_quotes => {
                in_quotes = true;
            }
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => {
                current.push(c);
            }
        }
    }
    fields.push(current);
    fields
}

/// Quote a field for CSV output if it needs it.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Join fields into one CSV line (no line terminator).
pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// A CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Read a CSV export. A missing file is not an error: returns `Ok(None)`.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            tracing::warn!("{} not found, treating as empty", path.display());
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();

        let headers = match lines.next() {
            Some(line) => parse_csv_line(line?.trim_start_matches('\u{feff}')),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for line in lines {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            rows.push(parse_csv_line(line));
        }

        Ok(Some(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        }))
    }

    /// Index of the first header matching any of `names` (case-insensitive).
    pub fn column(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| {
            self.headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        })
    }

    /// Like [`column`](Self::column) but a missing column is an error.
    pub fn require_column(&self, names: &[&str]) -> Result<usize> {
        self.column(names).ok_or_else(|| Error::MissingColumn {
            file: self.path.clone(),
            column: names.first().copied().unwrap_or_default().to_string(),
        })
    }
}

/// Field `idx` of a row, or "" when the row is short.
pub fn field(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Parse field `idx` as a u32. Empty, negative or garbage values give `None`.
pub fn field_u32(row: &[String], idx: usize) -> Option<u32> {
    field(row, idx).trim().parse().ok()
}
