//! XLSX output writer.
//!
//! One worksheet per table. Dates and timestamps are written as real Excel
//! date cells so spreadsheet tools can sort and chart them.

use std::borrow::Cow;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::warn;

use crate::core::normalize::truncate_chars;
use crate::core::table::{ColumnValues, Table};
use crate::error::ChatraceError;

const MAX_SHEET_NAME: usize = 31;

/// Excel's per-cell text limit, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Writes a single table to a one-sheet workbook.
pub fn write_xlsx(table: &Table, output_path: &Path) -> Result<(), ChatraceError> {
    write_xlsx_sheets(std::slice::from_ref(table), output_path)
}

/// Writes several tables to one workbook, one sheet each, in order.
///
/// Sheet names come from [`Table::name`], cleaned of characters Excel
/// rejects and cut to 31 characters.
pub fn write_xlsx_sheets(tables: &[Table], output_path: &Path) -> Result<(), ChatraceError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let date = Format::new().set_num_format("yyyy-mm-dd");
    let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for table in tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&table.name))?;
        write_sheet(worksheet, table, &header, &date, &datetime)?;
    }

    workbook.save(output_path)?;
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    table: &Table,
    header: &Format,
    date: &Format,
    datetime: &Format,
) -> Result<(), ChatraceError> {
    for (col, column) in (0u16..).zip(table.columns()) {
        worksheet.write_string_with_format(0, col, &column.name, header)?;

        match &column.values {
            ColumnValues::Text(values) => {
                for (row, value) in (1u32..).zip(values) {
                    let text = fit_cell(value);
                    if let Cow::Owned(_) = text {
                        warn!(
                            sheet = %table.name,
                            column = %column.name,
                            row,
                            chars = value.chars().count(),
                            "cell text over {MAX_CELL_CHARS} characters truncated"
                        );
                    }
                    worksheet.write_string(row, col, text.as_ref())?;
                }
            }
            ColumnValues::Count(values) => {
                for (row, value) in (1u32..).zip(values) {
                    worksheet.write_number(row, col, *value as f64)?;
                }
            }
            ColumnValues::Float(values) => {
                for (row, value) in (1u32..).zip(values) {
                    worksheet.write_number(row, col, *value)?;
                }
            }
            ColumnValues::Date(values) => {
                for (row, value) in (1u32..).zip(values) {
                    worksheet.write_datetime_with_format(row, col, value, date)?;
                }
            }
            ColumnValues::DateTime(values) => {
                for (row, value) in (1u32..).zip(values) {
                    worksheet.write_datetime_with_format(row, col, value, datetime)?;
                }
            }
        }
    }
    Ok(())
}

/// Cuts `value` to [`MAX_CELL_CHARS`], borrowing when it already fits.
fn fit_cell(value: &str) -> Cow<'_, str> {
    if value.chars().nth(MAX_CELL_CHARS).is_none() {
        return Cow::Borrowed(value);
    }
    let mut cut = value.to_string();
    truncate_chars(&mut cut, MAX_CELL_CHARS);
    Cow::Owned(cut)
}

/// Makes `name` acceptable as an Excel sheet name.
fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
