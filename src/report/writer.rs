//! レポートをxlsxとして書き出す

use std::path::Path;

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, FormatUnderline, Url, Workbook, Worksheet, XlsxError};
use tracing::{info, warn};

use crate::error::ReportError;

use super::sheet::{Cell, CellStyle, CellValue, Sheet};
use super::Report;

/// `<prefix>_<YYYYmmdd_HHMMSS>.xlsx`
pub fn artifact_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}_{}.xlsx", prefix, now.format("%Y%m%d_%H%M%S"))
}

impl Report {
    pub fn to_workbook(&self) -> Result<Workbook, ReportError> {
        let mut workbook = Workbook::new();

        for sheet in self.sheets() {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet)?;
        }

        Ok(workbook)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        info!(
            "Writing workbook with {} sheets: {}",
            self.sheets().len(),
            path.display()
        );

        let mut workbook = self.to_workbook()?;
        workbook.save(path)?;

        info!("Workbook saved: {}", path.display());
        Ok(())
    }

    /// ファイルを作らずにxlsxのバイト列を得る
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReportError> {
        let mut workbook = self.to_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), ReportError> {
    worksheet.set_name(sheet.name())?;

    for (r, row) in sheet.rows().iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            write_cell(worksheet, r as u32, c as u16, cell)?;
        }
    }

    for col in 0..sheet.column_count() {
        if let Some(width) = sheet.column_width(col) {
            worksheet.set_column_width(col as u16, width)?;
        }
    }

    if let Some(range) = sheet.autofilter() {
        worksheet.autofilter(range.first_row, range.first_col, range.last_row, range.last_col)?;
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> Result<(), XlsxError> {
    let format = build_format(&cell.style);

    match &cell.value {
        CellValue::Empty => {
            if cell.style != CellStyle::default() {
                worksheet.write_blank(row, col, &format)?;
            }
        }
        CellValue::Text(text) => match &cell.style.link {
            Some(target) => {
                // URLとして受け付けられない場合は文字列のまま残す
                if let Err(e) =
                    worksheet.write_url_with_format(row, col, Url::new(target.as_str()), &format)
                {
                    warn!("Cannot write hyperlink {} at ({}, {}): {}", target, row, col, e);
                    worksheet.write_string(row, col, text)?;
                }
            }
            None => {
                worksheet.write_string_with_format(row, col, text, &format)?;
            }
        },
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, dt, &format)?;
        }
    }

    Ok(())
}

fn build_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if let Some(rgb) = style.fill {
        format = format.set_background_color(Color::RGB(rgb));
    }
    if style.link.is_some() {
        format = format
            .set_font_color(Color::Blue)
            .set_underline(FormatUnderline::Single);
    }
    if let Some(num_format) = style.num_format {
        format = format.set_num_format(num_format);
    }

    format
}
