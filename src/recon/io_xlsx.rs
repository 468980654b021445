// Writing of the workbooks: one sheet, a header row, one row per constituency.

use std::path::Path;

use cons_relation::{Cell, RelationRow};
use rust_xlsxwriter::{Format, Workbook};
use snafu::ResultExt;

use crate::recon::io_common::SHEET_NAME;
use crate::recon::*;

pub fn write_workbook(path: &Path, rows: &[RelationRow]) -> ReconResult<()> {
    let p = path.display().to_string();
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .context(WritingExcelSnafu { path: &p })?;
    for (col, name) in RelationRow::COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *name, &header_format)
            .context(WritingExcelSnafu { path: &p })?;
    }

    for (idx, row) in rows.iter().enumerate() {
        // Row 0 is the header.
        let row32 = (idx + 1) as u32;
        for (col, cell) in row.cells().into_iter().enumerate() {
            let col16 = col as u16;
            match cell {
                // Missing values are left as empty cells.
                Cell::Missing => {}
                Cell::Int(i) => {
                    worksheet
                        .write_number(row32, col16, i as f64)
                        .context(WritingExcelSnafu { path: &p })?;
                }
                Cell::Float(f) => {
                    worksheet
                        .write_number(row32, col16, f)
                        .context(WritingExcelSnafu { path: &p })?;
                }
                Cell::Text(s) => {
                    worksheet
                        .write_string(row32, col16, s)
                        .context(WritingExcelSnafu { path: &p })?;
                }
            }
        }
    }

    workbook.save(path).context(WritingExcelSnafu { path: p })?;
    Ok(())
}
