//! Numeric records read from a simulation log.
//!
//! Each line of the log is one record: a comma-separated list of decimal
//! floating-point literals. Points are stored as six consecutive fields
//! `x, y, vx, vy, fx, fy`, so the n-th point starts at field `6 * n`.

use std::fs;
use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

/// Number of fields each point occupies in a record.
pub const FIELDS_PER_POINT: usize = 6;

/// Offset of the x coordinate within a point's fields.
pub const X_FIELD: usize = 0;

/// Offset of the y coordinate within a point's fields.
pub const Y_FIELD: usize = 1;

/// First field of point A.
pub const POINT_A_OFFSET: usize = 0;

/// First field of point B.
pub const POINT_B_OFFSET: usize = FIELDS_PER_POINT;

/// First field of point C.
pub const POINT_C_OFFSET: usize = 2 * FIELDS_PER_POINT;

/// Minimum field count for a record to describe a triangle (the y of C is the last read).
pub const MIN_FIELDS: usize = POINT_C_OFFSET + Y_FIELD + 1;

/// A 2D point in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One parsed line of the input log.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Field values in column order.
    pub fields: Vec<f64>,
}

impl Record {
    pub fn new(fields: Vec<f64>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read the point whose fields start at `offset`.
    ///
    /// Returns `None` if the record is too short to hold both coordinates.
    pub fn point_at(&self, offset: usize) -> Option<Point> {
        let x = *self.fields.get(offset + X_FIELD)?;
        let y = *self.fields.get(offset + Y_FIELD)?;
        Some(Point { x, y })
    }
}

/// Errors raised while loading records.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot read input file {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}, field {field}: {token:?} is not a number: {source}")]
    Parse {
        line: usize,
        field: usize,
        token: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Read and parse every record of the file at `path`.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(&text)?;
    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse records from in-memory text, one per line.
///
/// A final newline does not start an extra record, but any other empty line
/// is rejected as an unparsable field.
pub fn parse_records(text: &str) -> Result<Vec<Record>, LoadError> {
    text.lines()
        .enumerate()
        .map(|(i, line)| parse_line(line, i + 1))
        .collect()
}

fn parse_line(line: &str, line_number: usize) -> Result<Record, LoadError> {
    let fields = line
        .trim()
        .split(',')
        .enumerate()
        .map(|(i, token)| {
            let token = token.trim();
            token.parse::<f64>().map_err(|source| LoadError::Parse {
                line: line_number,
                field: i + 1,
                token: token.to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Record { fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_constants() {
        assert_eq!(POINT_A_OFFSET + X_FIELD, 0);
        assert_eq!(POINT_A_OFFSET + Y_FIELD, 1);
        assert_eq!(POINT_B_OFFSET + X_FIELD, 6);
        assert_eq!(POINT_B_OFFSET + Y_FIELD, 7);
        assert_eq!(POINT_C_OFFSET + X_FIELD, 12);
        assert_eq!(POINT_C_OFFSET + Y_FIELD, 13);
        assert_eq!(MIN_FIELDS, 14);
    }

    #[test]
    fn test_parse_preserves_line_order() {
        let records = parse_records("1,2,3\n4.5,-6e-1, 7 \n8\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].fields, vec![1.0, 2.0, 3.0]);
        assert_eq!(records[1].fields, vec![4.5, -0.6, 7.0]);
        assert_eq!(records[2].fields, vec![8.0]);
    }

    #[test]
    fn test_parse_crlf() {
        let records = parse_records("1,2\r\n3,4\r\n").unwrap();
        assert_eq!(records[1].fields, vec![3.0, 4.0]);
    }

    #[test]
    fn test_parse_empty_text() {
        assert!(parse_records("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_location() {
        let err = parse_records("1,2,3\n1,abc,3\n").unwrap_err();
        match err {
            LoadError::Parse {
                line, field, token, ..
            } => {
                assert_eq!(line, 2);
                assert_eq!(field, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_line_rejected() {
        let err = parse_records("1,2\n\n3,4\n").unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 2, field: 1, .. }));
    }

    #[test]
    fn test_point_at() {
        let record = Record::new(vec![0.5, 1.5, 0.0, 0.0, 0.0, 0.0, 2.5]);
        assert_eq!(record.point_at(POINT_A_OFFSET), Some(Point::new(0.5, 1.5)));
        // B has an x but no y
        assert_eq!(record.point_at(POINT_B_OFFSET), None);
    }

    #[test]
    fn test_load_records_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.txt");
        fs::write(&path, "0.0,0.0\n1.0,1.0\n").unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].fields, vec![1.0, 1.0]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_records(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, LoadError::FileAccess { .. }));
    }
}
