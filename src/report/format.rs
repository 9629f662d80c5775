//! シートの見た目を整える
//!
//! 何度適用しても結果は同じになる。

use crate::field::ColumnRole;

use super::sheet::{CellValue, Sheet};

/// ヘッダー行の背景色
pub const HEADER_FILL: u32 = 0xDDEBF7;
/// 日時列の表示形式
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
/// 列幅の上限（文字数）
pub const MAX_COLUMN_WIDTH: f64 = 80.0;

/// 太字ヘッダーは同じ文字数でも幅を取るため係数を掛ける
const HEADER_WIDTH_FACTOR: f64 = 1.5;
const COLUMN_PADDING: f64 = 2.0;

pub fn format(sheet: &mut Sheet) {
    style_header(sheet);

    if let Some(col) = sheet.find_role_column(ColumnRole::Hyperlink) {
        link_column(sheet, col);
    }
    if let Some(col) = sheet.find_role_column(ColumnRole::DateTime) {
        date_column(sheet, col);
    }

    for col in 0..sheet.column_count() {
        sheet.column_widths[col] = Some(column_width(sheet, col));
    }

    sheet.autofilter = sheet.dimensions();
}

fn style_header(sheet: &mut Sheet) {
    for cell in sheet.rows_mut()[0].iter_mut() {
        cell.style.bold = true;
        cell.style.fill = Some(HEADER_FILL);
    }
}

fn link_column(sheet: &mut Sheet, col: usize) {
    for row in sheet.rows_mut().iter_mut().skip(1) {
        let cell = &mut row[col];
        if let CellValue::Text(target) = &cell.value {
            cell.style.link = Some(target.clone());
        }
    }
}

fn date_column(sheet: &mut Sheet, col: usize) {
    for row in sheet.rows_mut().iter_mut().skip(1) {
        let cell = &mut row[col];
        if !cell.value.is_empty() {
            cell.style.num_format = Some(DATETIME_FORMAT);
        }
    }
}

/// `min(max(最長の値, ヘッダー長 × 1.5) + 2, 80)`
fn column_width(sheet: &Sheet, col: usize) -> f64 {
    let header_len = sheet.rows()[0][col].value.render().chars().count() as f64;
    let longest = sheet
        .rows()
        .iter()
        .map(|row| row[col].value.render().chars().count())
        .max()
        .unwrap_or(0) as f64;

    (longest.max(header_len * HEADER_WIDTH_FACTOR) + COLUMN_PADDING).min(MAX_COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::sheet::CellRange;
    use chrono::NaiveDate;

    fn sample() -> Sheet {
        let mut sheet = Sheet::new("OPEN", ["Issue Key", "Issue link", "Created"]);
        let created = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        sheet.push_row([
            CellValue::from("A-1"),
            CellValue::from("https://jira.example.com/browse/A-1"),
            CellValue::DateTime(created),
        ]);
        sheet.push_row([CellValue::from("A-2"), CellValue::Empty, CellValue::Empty]);
        sheet.push_row([
            CellValue::from("A-3"),
            CellValue::from("https://jira.example.com/browse/A-3"),
            CellValue::from("not a date"),
        ]);
        sheet
    }

    #[test]
    fn test_header_is_bold_and_filled() {
        let mut sheet = sample();
        format(&mut sheet);
        for cell in &sheet.rows()[0] {
            assert!(cell.style.bold);
            assert_eq!(cell.style.fill, Some(HEADER_FILL));
        }
        assert!(!sheet.rows()[1][0].style.bold);
    }

    #[test]
    fn test_links_and_dates() {
        let mut sheet = sample();
        format(&mut sheet);

        assert_eq!(
            sheet.cell(1, 1).unwrap().style.link.as_deref(),
            Some("https://jira.example.com/browse/A-1")
        );
        assert_eq!(sheet.cell(2, 1).unwrap().style.link, None);
        assert_eq!(sheet.cell(0, 1).unwrap().style.link, None);

        assert_eq!(sheet.cell(1, 2).unwrap().style.num_format, Some(DATETIME_FORMAT));
        assert_eq!(sheet.cell(2, 2).unwrap().style.num_format, None);
        // 変換できなかった日付文字列も表示形式だけは付く
        assert_eq!(sheet.cell(3, 2).unwrap().style.num_format, Some(DATETIME_FORMAT));
        assert_eq!(sheet.cell(1, 0).unwrap().style.num_format, None);
    }

    #[test]
    fn test_column_widths() {
        let mut sheet = sample();
        format(&mut sheet);

        // "Issue Key": 9 * 1.5 = 13.5 > 3
        assert_eq!(sheet.column_width(0), Some(15.5));
        // URL 35文字
        assert_eq!(sheet.column_width(1), Some(37.0));
        // "2024-03-05 09:15:00" 19文字 > 7 * 1.5
        assert_eq!(sheet.column_width(2), Some(21.0));
    }

    #[test]
    fn test_width_is_capped() {
        let mut sheet = Sheet::new("S", ["Header"]);
        sheet.push_row([CellValue::Text("x".repeat(500))]);
        format(&mut sheet);
        assert_eq!(sheet.column_width(0), Some(80.0));
    }

    #[test]
    fn test_autofilter_covers_populated_range() {
        let mut sheet = sample();
        format(&mut sheet);
        assert_eq!(
            sheet.autofilter(),
            Some(CellRange {
                first_row: 0,
                first_col: 0,
                last_row: 3,
                last_col: 2
            })
        );
    }

    #[test]
    fn test_format_is_idempotent() {
        let mut once = sample();
        format(&mut once);
        let mut twice = once.clone();
        format(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_role_columns_are_skipped() {
        let mut sheet = Sheet::new("VARIANT", ["Summary", "Status"]);
        sheet.push_row(["https://looks.like/a/link", "Open"].map(CellValue::from));
        format(&mut sheet);

        assert_eq!(sheet.cell(1, 0).unwrap().style.link, None);
        assert_eq!(sheet.cell(1, 1).unwrap().style.num_format, None);
        assert!(sheet.autofilter().is_some());
    }

    #[test]
    fn test_role_column_found_anywhere() {
        let mut sheet = Sheet::new("MOVED", ["Created", "Summary", "Issue link"]);
        sheet.push_row(["x", "y", "https://jira.example.com/browse/Z-9"].map(CellValue::from));
        format(&mut sheet);

        assert_eq!(sheet.cell(1, 0).unwrap().style.num_format, Some(DATETIME_FORMAT));
        assert!(sheet.cell(1, 2).unwrap().style.link.is_some());
    }
}
