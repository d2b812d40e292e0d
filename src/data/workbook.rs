//! Spreadsheet sources read with calamine into all-text DataFrames,
//! shaped like the CSV reader's output.

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

/// Extensions handled by calamine; anything else is read as CSV.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error(transparent)]
    Calamine(#[from] calamine::Error),
    #[error("workbook has no sheets")]
    NoSheets,
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Read `sheet` (or the first sheet) from a workbook.
///
/// `skip_rows` counts from the top of the sheet, not from its first used row.
pub fn read_sheet(
    path: &Path,
    sheet: Option<&str>,
    has_header: bool,
    skip_rows: usize,
) -> Result<DataFrame, WorkbookError> {
    let mut workbook = open_workbook_auto(path)?;
    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(WorkbookError::NoSheets)?,
    };
    let range = workbook.worksheet_range(&name)?;
    log::debug!("Sheet '{}' of {}: {:?} cells", name, path.display(), range.get_size());
    Ok(range_to_frame(&range, has_header, skip_rows)?)
}

/// Convert a cell range to string columns. Headerless ranges get
/// `column_1..column_n`, as the CSV reader names them.
pub fn range_to_frame(range: &Range<Data>, has_header: bool, skip_rows: usize) -> PolarsResult<DataFrame> {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));
    let width = start_col + range.width();

    let mut rows = range.rows().skip(skip_rows.saturating_sub(start_row));
    let names: Vec<String> = if has_header {
        let header = rows.next().unwrap_or(&[]);
        header_names(header, start_col, width)
    } else {
        (1..=width).map(|i| format!("column_{}", i)).collect()
    };

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); width];
    for row in rows {
        for (i, column) in values.iter_mut().enumerate() {
            let cell = i.checked_sub(start_col).and_then(|j| row.get(j));
            column.push(cell.and_then(cell_text));
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column::new(name.into(), values))
        .collect();
    DataFrame::new(columns)
}

fn header_names(header: &[Data], start_col: usize, width: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    (0..width)
        .map(|i| {
            let name = i
                .checked_sub(start_col)
                .and_then(|j| header.get(j))
                .and_then(cell_text)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && !seen.contains(s))
                .unwrap_or_else(|| format!("column_{}", i + 1));
            seen.insert(name.clone());
            name
        })
        .collect()
}

/// Integral floats lose their `.0` so codes read like their CSV export.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some((*f as i64).to_string()),
        other => Some(other.to_string()),
    }
}
