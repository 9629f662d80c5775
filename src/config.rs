use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ReportError;
use crate::html::DEFAULT_ROW_SELECTOR;
use crate::report::SheetNames;

/// 検索フィルターを表す環境変数の接頭辞（残りがシート名になる）
pub const FILTER_PREFIX: &str = "JIRA_FILTER_";

/// 名前付きのJQLクエリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    pub name: String,
    pub jql: String,
}

impl QueryFilter {
    pub fn new(name: impl Into<String>, jql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jql: jql.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// 課題検索ページのURL（`?jql=` を付ける前）
    pub base_url: String,
    /// 処理順に並んだクエリ
    pub queries: Vec<QueryFilter>,
    /// ページ読み込み完了の目印となる要素（空なら `document.readyState` を待つ）
    pub wait_selector: String,
    pub row_selector: String,
    pub timeout: Duration,
    pub headless: bool,
    pub output_dir: PathBuf,
    pub artifact_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            queries: Vec::new(),
            wait_selector: ".issue-table-wrapper".to_string(),
            row_selector: DEFAULT_ROW_SELECTOR.to_string(),
            timeout: Duration::from_secs(10),
            headless: true,
            output_dir: PathBuf::from("."),
            artifact_prefix: "jira_issues".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, jql: impl Into<String>) -> Self {
        self.queries.push(QueryFilter::new(name, jql));
        self
    }

    pub fn with_wait_selector(mut self, selector: impl Into<String>) -> Self {
        self.wait_selector = selector.into();
        self
    }

    pub fn with_row_selector(mut self, selector: impl Into<String>) -> Self {
        self.row_selector = selector.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_artifact_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.artifact_prefix = prefix.into();
        self
    }

    /// キー・値の組から設定を読み込み、検証する
    ///
    /// | キー | 内容 |
    /// |---|---|
    /// | `JIRA_URL_BASE` | 課題検索ページのURL（必須） |
    /// | `JIRA_FILTER_<NAME>` | JQL。`<NAME>` がシート名になる（1つ以上必須） |
    /// | `WAIT_ELEMENT` | 待機する要素のセレクタ（空ならページの読み込み完了を待つ） |
    /// | `WAIT_TIME` | 待機秒数 |
    /// | `HEADLESS_MODE` | `true` / `false`（省略時 `false`） |
    /// | `OUTPUT_DIR` | 出力先ディレクトリ |
    /// | `REPORT_PREFIX` | 出力ファイル名の接頭辞 |
    ///
    /// それ以外のキーは無視する。クエリは渡された順に処理される。
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default().with_headless(false);

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "JIRA_URL_BASE" => config.base_url = value.trim().to_string(),
                "WAIT_ELEMENT" => config.wait_selector = value.trim().to_string(),
                "WAIT_TIME" => {
                    let secs = value.trim().parse::<u64>().map_err(|e| {
                        ReportError::Config(format!("WAIT_TIME must be whole seconds ({:?}): {}", value, e))
                    })?;
                    config.timeout = Duration::from_secs(secs);
                }
                "HEADLESS_MODE" => config.headless = parse_bool(key, value)?,
                "OUTPUT_DIR" => config.output_dir = PathBuf::from(value),
                "REPORT_PREFIX" => config.artifact_prefix = value.to_string(),
                _ => {
                    if let Some(name) = key.strip_prefix(FILTER_PREFIX) {
                        config.queries.push(QueryFilter::new(name, value));
                    }
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 環境変数から読み込む（キー順に並べてから処理する）
    pub fn from_env() -> Result<Self, ReportError> {
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort();
        Self::from_vars(vars)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        self.parsed_base_url()?;

        if self.queries.is_empty() {
            return Err(ReportError::Config(format!(
                "no queries configured (expected {}<NAME> entries)",
                FILTER_PREFIX
            )));
        }
        if let Some(q) = self.queries.iter().find(|q| q.name.trim().is_empty()) {
            return Err(ReportError::Config(format!("query without a name: {:?}", q.jql)));
        }
        // シート名の衝突はブラウザを起動する前に検出する
        let mut names = SheetNames::new();
        for query in &self.queries {
            names.claim(&query.name)?;
        }
        if self.artifact_prefix.trim().is_empty() {
            return Err(ReportError::Config("artifact prefix is empty".into()));
        }
        Ok(())
    }

    /// `base_url?jql=<エンコード済みJQL>`
    pub fn query_url(&self, query: &QueryFilter) -> Result<String, ReportError> {
        let mut url = self.parsed_base_url()?;
        url.query_pairs_mut().append_pair("jql", &query.jql);
        Ok(url.into())
    }

    fn parsed_base_url(&self) -> Result<Url, ReportError> {
        Url::parse(&self.base_url)
            .map_err(|e| ReportError::Config(format!("invalid base URL {:?}: {}", self.base_url, e)))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ReportError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ReportError::Config(format!("{} must be true or false, got {:?}", key, other))),
    }
}
