//! Spreadsheet export of full-table downloads.

use indexmap::IndexSet;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::types::{CellValue, Record};

/// File extension of exported workbooks.
pub const EXPORT_EXTENSION: &str = "xlsx";

/// A spreadsheet offered to the user for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Download file name for a table.
pub fn export_file_name(table_name: &str) -> String {
    format!("{}.{}", table_name, EXPORT_EXTENSION)
}

/// Encode rows as an xlsx workbook.
///
/// The header row lists every column in first-seen order; cells a row does
/// not have are left blank.
pub fn encode_workbook(rows: &[Record]) -> Result<Vec<u8>, XlsxError> {
    let columns: IndexSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, name) in columns.iter().enumerate() {
            match row.get(*name) {
                Some(CellValue::Number(n)) => match n.as_f64() {
                    Some(value) => {
                        worksheet.write_number(row_num, col as u16, value)?;
                    }
                    None => {
                        worksheet.write_string(row_num, col as u16, n.to_string())?;
                    }
                },
                Some(CellValue::Text(text)) => {
                    worksheet.write_string(row_num, col as u16, text.as_str())?;
                }
                Some(CellValue::Null) | None => {}
            }
        }
    }

    workbook.save_to_buffer()
}
