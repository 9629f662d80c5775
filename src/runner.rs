//! クエリを1件ずつ順番に処理してDatasetを集める

use tracing::{error, info};

use crate::config::{QueryFilter, ReportConfig};
use crate::error::ReportError;
use crate::html::IssueTable;
use crate::record::{build, Dataset};
use crate::traits::PageLoader;

/// 収集結果
#[derive(Debug, Default)]
pub struct Collection {
    /// 設定された順のDataset
    pub datasets: Vec<Dataset>,
    /// ページを開けなかったクエリ名
    pub failed_queries: Vec<String>,
}

/// 全クエリを順に処理する
///
/// あるクエリのページ取得に失敗しても、それまでに集めたDatasetは保持したまま次へ進む。
/// 失敗はリトライしない。
pub async fn collect<L>(loader: &mut L, config: &ReportConfig) -> Collection
where
    L: PageLoader + ?Sized,
{
    info!("Processing {} queries", config.queries.len());
    let mut collection = Collection::default();

    for query in &config.queries {
        info!("Processing query: {}", query.name);

        match collect_one(loader, config, query).await {
            Ok(dataset) => collection.datasets.push(dataset),
            Err(e) => {
                error!("Query {} failed: {}", query.name, e);
                collection.failed_queries.push(query.name.clone());
            }
        }
    }

    collection
}

async fn collect_one<L>(
    loader: &mut L,
    config: &ReportConfig,
    query: &QueryFilter,
) -> Result<Dataset, ReportError>
where
    L: PageLoader + ?Sized,
{
    let url = config.query_url(query)?;
    let html = loader
        .load(&url, &config.wait_selector, config.timeout)
        .await?;

    Ok(dataset_from_html(&query.name, &html, &url, &config.row_selector))
}

/// HTMLスナップショットからDatasetを作る
///
/// `scraper::Html` は `Send` ではないため、await をまたがないようにここで完結させる。
pub fn dataset_from_html(name: &str, html: &str, page_url: &str, row_selector: &str) -> Dataset {
    let table = IssueTable::parse(html, Some(page_url));
    build(name, table.rows_matching(row_selector))
}
