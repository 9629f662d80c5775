//! 複数のDatasetを1つのワークブックにまとめる

mod format;
mod sheet;
mod writer;

use std::collections::HashMap;

use tracing::info;

use crate::error::ReportError;
use crate::field::Field;
use crate::record::Dataset;

pub use format::{format, DATETIME_FORMAT, HEADER_FILL, MAX_COLUMN_WIDTH};
pub use sheet::{Cell, CellRange, CellStyle, CellValue, Sheet};
pub use writer::artifact_file_name;

/// xlsxのシート名の最大文字数
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Datasetごとに1シートを持つレポート
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// 全シートの課題件数
    pub fn total_issues(&self) -> usize {
        self.sheets.iter().map(Sheet::data_row_count).sum()
    }

    /// 全シートに書式を適用する
    pub fn format(&mut self) {
        for sheet in &mut self.sheets {
            format::format(sheet);
        }
    }
}

/// Datasetを渡された順にシート化する
///
/// シート名は xlsx で使える形に正規化する。正規化後の名前が空・予約語になる場合や、
/// 他のDatasetと衝突する場合（大文字小文字は区別しない）はエラーとし、上書きはしない。
pub fn aggregate(datasets: impl IntoIterator<Item = Dataset>) -> Result<Report, ReportError> {
    let mut names = SheetNames::new();
    let mut sheets = Vec::new();

    for dataset in datasets {
        let name = names.claim(dataset.name())?;

        info!("Creating sheet {} with {} issues", name, dataset.len());

        let mut sheet = Sheet::new(name, Field::ALL.map(Field::header));
        for record in dataset.records() {
            sheet.push_row(record.values().map(|(_, value)| CellValue::from(value)));
        }
        sheets.push(sheet);
    }

    Ok(Report { sheets })
}

/// 使用済みのシート名（正規化後、大文字小文字を区別しない）
#[derive(Debug, Default)]
pub struct SheetNames {
    seen: HashMap<String, String>,
}

impl SheetNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// 名前を正規化して登録する。既出の名前と衝突すればエラー。
    pub fn claim(&mut self, name: &str) -> Result<String, ReportError> {
        let normalized = normalize_sheet_name(name)?;

        if let Some(first) = self.seen.insert(normalized.to_lowercase(), name.to_string()) {
            return Err(ReportError::DuplicateSheetName {
                first,
                second: name.to_string(),
                normalized,
            });
        }
        Ok(normalized)
    }
}

/// xlsxのシート名として使える形に変換する
pub fn normalize_sheet_name(name: &str) -> Result<String, ReportError> {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_SHEET_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = trim_sheet_name(&replaced);
    let truncated: String = trimmed.chars().take(MAX_SHEET_NAME_LEN).collect();
    let normalized = trim_sheet_name(&truncated).to_string();

    // "History" は Excel の予約名
    if normalized.is_empty() || normalized.eq_ignore_ascii_case("history") {
        return Err(ReportError::InvalidSheetName(name.to_string()));
    }
    Ok(normalized)
}

/// 先頭・末尾の空白とアポストロフィを除く
fn trim_sheet_name(name: &str) -> &str {
    name.trim_matches(|c: char| c == '\'' || c.is_whitespace())
}
