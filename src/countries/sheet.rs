use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use thiserror::Error;

use crate::countries::validator::RawRow;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("could not open workbook: {0}")]
    Open(#[from] calamine::Error),
}

/// Reads data rows of the first worksheet, paired with their 1-based row number.
/// Row 1 is the header and is skipped.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<(usize, RawRow)>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };
    Ok(extract_rows(&range))
}

pub fn extract_rows(range: &Range<Data>) -> Vec<(usize, RawRow)> {
    let Some((last_row, _)) = range.end() else {
        return Vec::new();
    };

    (1..=last_row)
        .map(|row| {
            let raw = RawRow {
                name: cell_text(range, row, 0),
                capital: cell_text(range, row, 1),
                region: cell_text(range, row, 2),
                population: cell_text(range, row, 3),
            };
            (row as usize + 1, raw)
        })
        .collect()
}

// Positions are absolute; calamine ranges may start past A1.
fn cell_text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        None | Some(Data::Empty) | Some(Data::Error(_)) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
