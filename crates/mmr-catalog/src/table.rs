use std::fs;
use std::path::Path;

use mmr_core::errors::{codes, ErrorInfo, MmrError};
use mmr_core::BodyCount;
use serde::{Deserialize, Serialize};

/// One candidate row of the resonance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// One based line number inside the table file.
    pub line: usize,
    /// Integer coefficients in table order.
    pub integers: Vec<i32>,
    /// Reference semi-major axis.
    pub axis: f64,
}

fn malformed(line: usize, message: impl Into<String>) -> MmrError {
    MmrError::Catalog(
        ErrorInfo::new(codes::MALFORMED_TABLE_ROW, message).with_context("line", line.to_string()),
    )
}

/// Parses a single table row for the given layout.
pub fn parse_row(text: &str, line: usize, count: BodyCount) -> Result<TableRow, MmrError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let axis_column = count.axis_column();
    if fields.len() <= axis_column {
        return Err(malformed(
            line,
            format!(
                "expected at least {} columns, found {}",
                axis_column + 1,
                fields.len()
            ),
        ));
    }
    let integers = fields[..axis_column]
        .iter()
        .map(|field| {
            field
                .parse::<i32>()
                .map_err(|err| malformed(line, format!("bad integer {field}: {err}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let axis = fields[axis_column]
        .parse::<f64>()
        .map_err(|err| malformed(line, format!("bad axis {}: {err}", fields[axis_column])))?;
    Ok(TableRow {
        line,
        integers,
        axis,
    })
}

/// Loads every row of the table. Blank lines and `#` comments are ignored.
pub fn load_table(path: &Path, count: BodyCount) -> Result<Vec<TableRow>, MmrError> {
    if !path.is_file() {
        return Err(MmrError::Catalog(
            ErrorInfo::new(codes::MISSING_INPUT_FILE, "resonance table not found")
                .with_context("path", path.display().to_string())
                .with_hint("generate the resonance table for the configured planets first"),
        ));
    }
    let contents = fs::read_to_string(path).map_err(|err| {
        MmrError::Catalog(
            ErrorInfo::new("table-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    contents
        .lines()
        .enumerate()
        .filter(|(_, text)| {
            let trimmed = text.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(idx, text)| parse_row(text, idx + 1, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_body_row() {
        let row = parse_row("4 -2 -1 0 0 -1 2.7651", 3, BodyCount::Three).unwrap();
        assert_eq!(row.integers, vec![4, -2, -1, 0, 0, -1]);
        assert_eq!(row.axis, 2.7651);
        assert_eq!(row.line, 3);
    }

    #[test]
    fn short_row_is_rejected() {
        let err = parse_row("1 -3 0 2", 9, BodyCount::Two).unwrap_err();
        assert_eq!(err.code(), codes::MALFORMED_TABLE_ROW);
        assert_eq!(err.info().context.get("line").map(String::as_str), Some("9"));
    }

    #[test]
    fn non_integer_coefficient_is_rejected() {
        let err = parse_row("1 x 0 2 2.5", 1, BodyCount::Two).unwrap_err();
        assert_eq!(err.code(), codes::MALFORMED_TABLE_ROW);
    }
}
