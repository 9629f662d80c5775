//! 集計件数（メール下書きなど後段の処理向け）

use serde::Serialize;

use crate::report::{Report, Sheet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetCount {
    pub name: String,
    pub issues: usize,
}

/// シートごとの件数と合計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub sheets: Vec<SheetCount>,
    pub total: usize,
}

impl From<&Report> for ReportSummary {
    fn from(report: &Report) -> Self {
        let sheets: Vec<SheetCount> = report
            .sheets()
            .iter()
            .map(|sheet: &Sheet| SheetCount {
                name: sheet.name().to_string(),
                issues: sheet.data_row_count(),
            })
            .collect();
        let total = sheets.iter().map(|s| s.issues).sum();

        Self { sheets, total }
    }
}

impl ReportSummary {
    /// シートごとの `- 名前: 件数` 行
    pub fn breakdown(&self) -> String {
        self.sheets
            .iter()
            .map(|s| format!("- {}: {}", s.name, s.issues))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// テンプレート中の `{total}` `{sheet_count}` `{breakdown}` を置き換える
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{total}", &self.total.to_string())
            .replace("{sheet_count}", &self.sheets.len().to_string())
            .replace("{breakdown}", &self.breakdown())
    }
}
