use issue_report::{ReportConfig, ReportRequest, ReportService};
use tower::Service;

const MAIL_TEMPLATE: &str = "Jira report: {total} issues across {sheet_count} filters\n{breakdown}";

#[tokio::main]
async fn main() {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter("info,issue_report=debug")
        .init();

    // 環境変数から設定を読み込む
    // 例: JIRA_URL_BASE=https://jira.example.com/issues/ JIRA_FILTER_OPEN='resolution = Unresolved'
    let config = match ReportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("設定エラー: {}", e);
            std::process::exit(2);
        }
    };

    println!("=== Jira Issue Report ===");

    let mut service = ReportService::new();
    match service.call(ReportRequest::new(config)).await {
        Ok(result) => {
            println!("成功! 保存先: {:?}", result.path);
            println!(
                "{}",
                serde_json::to_string_pretty(&result.summary).unwrap_or_default()
            );
            println!("\n{}", result.summary.render(MAIL_TEMPLATE));
            if !result.failed_queries.is_empty() {
                eprintln!("取得できなかったクエリ: {:?}", result.failed_queries);
            }
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    }
}
