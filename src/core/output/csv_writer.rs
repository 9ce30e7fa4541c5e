//! CSV output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::table::Table;
use crate::error::ChatraceError;

/// Writes a table to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Header: the table's column names, in order
/// - Dates: `YYYY-MM-DD`, timestamps: `YYYY-MM-DD HH:MM:SS`
/// - Encoding: UTF-8
pub fn write_csv(table: &Table, output_path: &Path) -> Result<(), ChatraceError> {
    let file = File::create(output_path)?;
    write_records(table, file)
}

/// Converts a table to a CSV string.
pub fn to_csv(table: &Table) -> Result<String, ChatraceError> {
    let mut buffer = Vec::new();
    write_records(table, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_records<W: Write>(table: &Table, sink: W) -> Result<(), ChatraceError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);

    writer.write_record(table.headers())?;

    for row in 0..table.height() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| column.values.display(row).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
