//! シートのメモリ上表現
//!
//! 書式設定はこのモデルに対して行い、xlsxへの書き出しは [`super::writer`] が担う。

use chrono::NaiveDateTime;

use crate::extract::FieldValue;
use crate::field::ColumnRole;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// 表示上の文字列（列幅計算用）
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&FieldValue> for CellValue {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(s) if s.is_empty() => CellValue::Empty,
            FieldValue::Text(s) => CellValue::Text(s.clone()),
            FieldValue::DateTime(dt) => CellValue::DateTime(*dt),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    /// 背景色 (0xRRGGBB)
    pub fill: Option<u32>,
    /// ハイパーリンク先
    pub link: Option<String>,
    pub num_format: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style: CellStyle::default(),
        }
    }
}

/// 0始まりの矩形範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

/// 1シート分の表。0行目がヘッダー。
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    pub(crate) column_widths: Vec<Option<f64>>,
    pub(crate) autofilter: Option<CellRange>,
}

impl Sheet {
    pub fn new<'a>(name: impl Into<String>, headers: impl IntoIterator<Item = &'a str>) -> Self {
        let header: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(CellValue::from(h)))
            .collect();
        let columns = header.len();

        Self {
            name: name.into(),
            rows: vec![header],
            column_widths: vec![None; columns],
            autofilter: None,
        }
    }

    /// データ行を追加する。列数はヘッダーに合わせて切り詰め・補完される。
    pub fn push_row(&mut self, values: impl IntoIterator<Item = CellValue>) {
        let columns = self.column_count();
        let mut row: Vec<Cell> = values.into_iter().take(columns).map(Cell::new).collect();
        row.resize_with(columns, || Cell::new(CellValue::Empty));
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<Cell>] {
        &mut self.rows
    }

    pub fn column_count(&self) -> usize {
        self.rows[0].len()
    }

    /// ヘッダーを除いた行数
    pub fn data_row_count(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn headers(&self) -> impl Iterator<Item = String> + '_ {
        self.rows[0].iter().map(|c| c.value.render())
    }

    /// ヘッダー行を走査して列を探す
    pub fn find_column(&self, header: &str) -> Option<usize> {
        self.rows[0]
            .iter()
            .position(|c| matches!(&c.value, CellValue::Text(h) if h == header))
    }

    /// 指定した役割を持つ列
    pub fn find_role_column(&self, role: ColumnRole) -> Option<usize> {
        role.header().and_then(|h| self.find_column(h))
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn column_width(&self, col: usize) -> Option<f64> {
        self.column_widths.get(col).copied().flatten()
    }

    pub fn autofilter(&self) -> Option<CellRange> {
        self.autofilter
    }

    /// ヘッダーとデータ行を含む使用範囲
    pub fn dimensions(&self) -> Option<CellRange> {
        let columns = self.column_count();
        if columns == 0 {
            return None;
        }
        Some(CellRange {
            first_row: 0,
            first_col: 0,
            last_row: (self.rows.len() - 1) as u32,
            last_col: (columns - 1) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_row_pads_and_truncates() {
        let mut sheet = Sheet::new("S", ["A", "B", "C"]);
        sheet.push_row([CellValue::from("x")]);
        sheet.push_row(["1", "2", "3", "4"].map(CellValue::from));

        assert_eq!(sheet.data_row_count(), 2);
        assert_eq!(sheet.rows()[1].len(), 3);
        assert!(sheet.rows()[1][2].value.is_empty());
        assert_eq!(sheet.rows()[2][2].value, CellValue::Text("3".into()));
    }

    #[test]
    fn test_find_column_by_header() {
        let sheet = Sheet::new("S", ["Summary", "Issue link"]);
        assert_eq!(sheet.find_column("Issue link"), Some(1));
        assert_eq!(sheet.find_role_column(ColumnRole::Hyperlink), Some(1));
        assert_eq!(sheet.find_role_column(ColumnRole::DateTime), None);
    }

    #[test]
    fn test_dimensions() {
        let mut sheet = Sheet::new("S", ["A", "B"]);
        assert_eq!(
            sheet.dimensions(),
            Some(CellRange {
                first_row: 0,
                first_col: 0,
                last_row: 0,
                last_col: 1
            })
        );
        sheet.push_row([CellValue::Empty, CellValue::Empty]);
        assert_eq!(sheet.dimensions().map(|r| r.last_row), Some(1));
        assert_eq!(Sheet::new("E", Vec::<&str>::new()).dimensions(), None);
    }
}
