//! Jira課題テーブルのスクレイピングとExcelレポート生成
//!
//! - 課題検索ページ（`#issuetable`）の各行をRecordに正規化
//! - クエリごとにDatasetを作成
//! - 全Datasetを1つのワークブック（クエリごとに1シート）に出力
//!
//! # 使用例
//!
//! ```rust,ignore
//! use issue_report::{ReportConfig, ReportRequest, ReportService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ReportConfig::new("https://jira.example.com/issues/")
//!         .with_query("OPEN", "resolution = Unresolved")
//!         .with_query("UNASSIGNED", "assignee is EMPTY")
//!         .with_output_dir("./reports");
//!
//!     let mut service = ReportService::new();
//!     let result = service.call(ReportRequest::new(config)).await.unwrap();
//!     println!("{:?}: {} issues", result.path, result.summary.total);
//! }
//! ```
//!
//! # ブラウザを使わない例
//!
//! ```rust
//! use issue_report::{aggregate, build, IssueTable};
//!
//! let html = r#"<table id="issuetable"><tbody>
//!     <tr data-issuekey="OPS-1"><td class="summary"><p>Disk full</p></td></tr>
//! </tbody></table>"#;
//!
//! let table = IssueTable::parse(html, Some("https://jira.example.com/issues/"));
//! let dataset = build("OPEN", table.rows());
//!
//! let mut report = aggregate(vec![dataset]).unwrap();
//! report.format();
//! assert_eq!(report.total_issues(), 1);
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod field;
pub mod html;
pub mod record;
pub mod report;
pub mod runner;
pub mod service;
pub mod summary;
pub mod traits;

// 主要な型をリエクスポート
pub use browser::BrowserLoader;
pub use config::{QueryFilter, ReportConfig};
pub use error::ReportError;
pub use extract::{extract, Extraction, FieldValue};
pub use field::{ColumnRole, Field};
pub use html::IssueTable;
pub use record::{assemble, build, Dataset, Record};
pub use report::{aggregate, Report, Sheet, SheetNames};
pub use runner::{collect, Collection};
pub use service::{ReportRequest, ReportResult, ReportService};
pub use summary::ReportSummary;
pub use traits::{PageLoader, RowElement};
