//! Parquet output writer backed by polars.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::core::table::{ColumnValues, Table};
use crate::error::ChatraceError;

/// Writes a table to a Parquet file.
///
/// Column types map to `Utf8`/`String`, `UInt64`, `Float64`, `Date` and
/// `Datetime(ms)`.
pub fn write_parquet(table: &Table, output_path: &Path) -> Result<(), ChatraceError> {
    let mut frame = to_dataframe(table)?;
    let mut file = File::create(output_path)?;
    ParquetWriter::new(&mut file).finish(&mut frame)?;
    Ok(())
}

/// Converts a table into a polars `DataFrame`.
pub fn to_dataframe(table: &Table) -> Result<DataFrame, ChatraceError> {
    let series: Vec<Series> = table
        .columns()
        .iter()
        .map(|column| {
            let name = column.name.as_str();
            match &column.values {
                ColumnValues::Text(values) => Series::new(name, values.as_slice()),
                ColumnValues::Count(values) => Series::new(name, values.as_slice()),
                ColumnValues::Float(values) => Series::new(name, values.as_slice()),
                ColumnValues::Date(values) => {
                    DateChunked::from_naive_date(name, values.iter().copied()).into_series()
                }
                ColumnValues::DateTime(values) => DatetimeChunked::from_naive_datetime(
                    name,
                    values.iter().copied(),
                    TimeUnit::Milliseconds,
                )
                .into_series(),
            }
        })
        .collect();

    Ok(DataFrame::new(series)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::Column;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn sample() -> Table {
        let day = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        Table::new("records")
            .with_column(Column::new(
                "dt",
                ColumnValues::DateTime(vec![day.and_hms_opt(10, 0, 0).unwrap()]),
            ))
            .with_column(Column::new("dt_date", ColumnValues::Date(vec![day])))
            .with_column(Column::new("name", ColumnValues::Text(vec!["Alice".into()])))
            .with_column(Column::new("qtde", ColumnValues::Count(vec![7])))
    }

    #[test]
    fn test_to_dataframe_shape_and_types() {
        let frame = to_dataframe(&sample()).unwrap();
        assert_eq!(frame.shape(), (1, 4));
        assert_eq!(frame.column("dt_date").unwrap().dtype(), &DataType::Date);
        assert_eq!(frame.column("qtde").unwrap().dtype(), &DataType::UInt64);
    }

    #[test]
    fn test_write_parquet_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.parquet");
        write_parquet(&sample(), &path).unwrap();

        let file = File::open(&path).unwrap();
        let frame = ParquetReader::new(file).finish().unwrap();
        assert_eq!(frame.height(), 1);
        assert_eq!(
            frame.get_column_names(),
            ["dt", "dt_date", "name", "qtde"]
        );
    }
}
