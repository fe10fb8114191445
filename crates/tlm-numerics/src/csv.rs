//! Minimal numeric CSV reader for lookup tables.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NumericsError, NumericsResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    pub separator: char,
    /// Lines whose first non-blank character is this are ignored.
    pub comment: char,
    /// Leading lines dropped before parsing, e.g. a header row.
    pub skip_lines: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            comment: '#',
            skip_lines: 0,
        }
    }
}

/// Parsed rows of numbers, each remembering its source line.
#[derive(Clone, Debug, Default)]
pub struct CsvParser {
    rows: Vec<Vec<f64>>,
    lines: Vec<usize>,
}

impl CsvParser {
    pub fn from_text(text: &str, options: &CsvOptions) -> NumericsResult<Self> {
        let mut parser = Self::default();
        for (i, raw) in text.lines().enumerate().skip(options.skip_lines) {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(options.comment) {
                continue;
            }
            let row = line
                .split(options.separator)
                .map(|field| {
                    let field = field.trim();
                    field.parse::<f64>().map_err(|_| NumericsError::Csv {
                        line: line_no,
                        what: format!("'{field}' is not a number"),
                    })
                })
                .collect::<NumericsResult<Vec<f64>>>()?;
            parser.rows.push(row);
            parser.lines.push(line_no);
        }
        Ok(parser)
    }

    pub fn from_file(path: impl AsRef<Path>, options: &CsvOptions) -> NumericsResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| NumericsError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_text(&text, options)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Copy column `column` out of every row.
    pub fn column(&self, column: usize) -> NumericsResult<Vec<f64>> {
        self.rows
            .iter()
            .zip(&self.lines)
            .map(|(row, &line)| {
                row.get(column)
                    .copied()
                    .ok_or(NumericsError::MissingColumn { column, line })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_header_and_comments() {
        let text = "x;y\n# comment\n0; 1.5\n\n  1 ;2.5\n";
        let options = CsvOptions {
            separator: ';',
            skip_lines: 1,
            ..CsvOptions::default()
        };
        let p = CsvParser::from_text(text, &options).unwrap();
        assert_eq!(p.num_rows(), 2);
        assert_eq!(p.column(0).unwrap(), vec![0.0, 1.0]);
        assert_eq!(p.column(1).unwrap(), vec![1.5, 2.5]);
    }

    #[test]
    fn bad_field_reports_line() {
        let err = CsvParser::from_text("1,2\n3,abc\n", &CsvOptions::default()).unwrap_err();
        match err {
            NumericsError::Csv { line, what } => {
                assert_eq!(line, 2);
                assert!(what.contains("abc"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn ragged_column_is_missing() {
        let p = CsvParser::from_text("1,2\n3\n", &CsvOptions::default()).unwrap();
        assert_eq!(
            p.column(1).unwrap_err(),
            NumericsError::MissingColumn { column: 1, line: 2 }
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvParser::from_file("/nonexistent/table.csv", &CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, NumericsError::Io { .. }));
    }
}
