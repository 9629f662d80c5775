use std::time::Duration;

use async_trait::async_trait;

use crate::error::ReportError;

/// 課題テーブルの1行（または行内の要素）
///
/// どの操作も、見つからない場合はエラーではなく `None` / 空文字列を返す。
pub trait RowElement: Sized {
    /// 属性値
    fn attribute(&self, name: &str) -> Option<String>;

    /// セレクタに一致する最初の子孫要素
    fn find(&self, selector: &str) -> Option<Self>;

    /// 空白を詰めたテキスト
    fn text(&self) -> String;
}

#[async_trait]
pub trait PageLoader: Send {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ReportError>;

    /// URLを開き、`wait_selector` の出現を最大 `timeout` 待ってからHTMLを返す
    ///
    /// 待機のタイムアウトはエラーにしない。
    async fn load(
        &mut self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> Result<String, ReportError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ReportError>;
}
