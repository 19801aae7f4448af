//! Delimited text rendering of a finished table.
//!
//! Reads the table only through its public accessors. Missing float values
//! (`NaN`) render as empty fields.

use std::io::Write;

use crate::{column::ColumnData, config::ExportConfig, table::Table, Result};

pub fn write_delimited<W: Write>(table: &Table, writer: &mut W, config: &ExportConfig) -> Result<()> {
    let names = table.column_names();
    let mut delimiter = [0u8; 4];
    let delimiter = config.delimiter.encode_utf8(&mut delimiter);

    if config.header {
        writeln!(writer, "{}", names.join(delimiter))?;
    }

    let columns = names
        .iter()
        .map(|name| table.column_data(name))
        .collect::<Result<Vec<_>>>()?;

    for row in 0..table.row_count() {
        let fields: Vec<String> = columns
            .iter()
            .map(|data| format_cell(data, row, config.precision))
            .collect();
        writeln!(writer, "{}", fields.join(delimiter))?;
    }
    Ok(())
}

pub fn to_delimited_string(table: &Table, config: &ExportConfig) -> Result<String> {
    let mut buffer = Vec::new();
    write_delimited(table, &mut buffer, config)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn format_cell(data: &ColumnData, row: usize, precision: usize) -> String {
    match data {
        ColumnData::Float(values) => match values.get(row) {
            Some(v) if v.is_nan() => String::new(),
            Some(v) => format!("{v:.precision$}"),
            None => String::new(),
        },
        ColumnData::Integer(values) => values.get(row).map(i64::to_string).unwrap_or_default(),
        ColumnData::Boolean(values) => values.get(row).map(bool::to_string).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_cells_by_type() {
        let floats = ColumnData::Float(vec![1.23456, f64::NAN]);
        assert_eq!(format_cell(&floats, 0, 2), "1.23");
        assert_eq!(format_cell(&floats, 1, 2), "");
        assert_eq!(format_cell(&ColumnData::Integer(vec![7]), 0, 2), "7");
        assert_eq!(format_cell(&ColumnData::Boolean(vec![true]), 0, 2), "true");
    }
}
