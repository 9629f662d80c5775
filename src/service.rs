use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::Local;
use tower::Service;
use tracing::{info, warn};

use crate::browser::BrowserLoader;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::report::{aggregate, artifact_file_name};
use crate::runner::collect;
use crate::summary::ReportSummary;
use crate::traits::PageLoader;

/// レポート作成リクエスト
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub config: ReportConfig,
}

impl ReportRequest {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }
}

impl From<ReportConfig> for ReportRequest {
    fn from(config: ReportConfig) -> Self {
        Self::new(config)
    }
}

/// レポート作成結果
#[derive(Debug)]
pub struct ReportResult {
    pub path: PathBuf,
    pub summary: ReportSummary,
    /// ページを開けず、シートに含まれなかったクエリ
    pub failed_queries: Vec<String>,
}

/// tower::Serviceを実装したレポートサービス
#[derive(Debug, Clone, Default)]
pub struct ReportService {}

impl ReportService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<ReportRequest> for ReportService {
    type Response = ReportResult;
    type Error = ReportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ReportRequest) -> Self::Future {
        info!("Report request received: {} queries", req.config.queries.len());

        Box::pin(async move {
            let config = req.config;
            let mut loader = BrowserLoader::new(config.headless);
            run(&mut loader, &config).await
        })
    }
}

/// 検証 → 初期化 → 全クエリ収集 → 終了 → 集約 → 書式設定 → 保存
pub async fn run<L>(loader: &mut L, config: &ReportConfig) -> Result<ReportResult, ReportError>
where
    L: PageLoader + ?Sized,
{
    config.validate()?;

    loader.initialize().await?;
    let collection = collect(loader, config).await;
    if let Err(e) = loader.close().await {
        warn!("Failed to close loader: {}", e);
    }

    let mut report = aggregate(collection.datasets)?;
    report.format();

    std::fs::create_dir_all(&config.output_dir)?;
    let file_name = artifact_file_name(&config.artifact_prefix, Local::now().naive_local());
    let path = config.output_dir.join(file_name);
    report.save(&path)?;

    let summary = ReportSummary::from(&report);
    info!(
        "Report complete: path={:?}, sheets={}, issues={}",
        path,
        summary.sheets.len(),
        summary.total
    );

    Ok(ReportResult {
        path,
        summary,
        failed_queries: collection.failed_queries,
    })
}
