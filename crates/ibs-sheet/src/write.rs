//! [`Sheet`]s → `.xlsx` bytes.

use ibs_core::sheet::Sheet;
use rust_xlsxwriter::{Color, Format, Workbook};

use crate::error::Result;

pub(crate) fn write_xlsx(sheets: &[Sheet]) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xD9E1F2));

  for sheet in sheets {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&sheet.name)?;

    for (col, title) in (0u16..).zip(&sheet.headers) {
      worksheet.write_string_with_format(0, col, title, &header)?;
    }
    // Everything is written as text so codes keep their leading zeros.
    for (row, cells) in (1u32..).zip(&sheet.rows) {
      for (col, value) in (0u16..).zip(cells) {
        if !value.is_empty() {
          worksheet.write_string(row, col, value)?;
        }
      }
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
  }

  Ok(workbook.save_to_buffer()?)
}
