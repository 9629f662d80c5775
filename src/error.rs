use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("設定エラー: {0}")]
    Config(String),

    #[error("シート名が不正です: {0:?}")]
    InvalidSheetName(String),

    #[error("シート名が重複しています: {first:?} と {second:?} がどちらも {normalized:?} になります")]
    DuplicateSheetName {
        first: String,
        second: String,
        normalized: String,
    },

    #[error("ワークブック出力エラー: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),
}
