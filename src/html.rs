//! ページのHTMLスナップショットから課題テーブルの行を取り出す

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::traits::RowElement;

/// 課題テーブルの行セレクタ
pub const DEFAULT_ROW_SELECTOR: &str = "#issuetable tbody tr";

/// 解析済みのページ
pub struct IssueTable {
    document: Html,
    page_url: Option<Url>,
}

impl IssueTable {
    /// `page_url` を渡すと、相対リンクをそのURL基準で絶対URLに解決する
    pub fn parse(html: &str, page_url: Option<&str>) -> Self {
        let page_url = page_url.and_then(|u| match Url::parse(u) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Ignoring unparsable page URL {}: {}", u, e);
                None
            }
        });

        Self {
            document: Html::parse_document(html),
            page_url,
        }
    }

    pub fn rows(&self) -> Vec<HtmlRow<'_>> {
        self.rows_matching(DEFAULT_ROW_SELECTOR)
    }

    /// セレクタが不正な場合は行なしとして扱う
    pub fn rows_matching(&self, selector: &str) -> Vec<HtmlRow<'_>> {
        let Some(selector) = parse_selector(selector) else {
            return Vec::new();
        };

        self.document
            .select(&selector)
            .map(|element| HtmlRow {
                element,
                base: self.page_url.as_ref(),
            })
            .collect()
    }
}

/// `scraper` の要素をラップした行
#[derive(Debug, Clone, Copy)]
pub struct HtmlRow<'a> {
    element: ElementRef<'a>,
    base: Option<&'a Url>,
}

impl RowElement for HtmlRow<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        let value = self.element.value().attr(name)?;

        match self.base {
            Some(base) if name == "href" => Some(
                base.join(value)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| value.to_string()),
            ),
            _ => Some(value.to_string()),
        }
    }

    fn find(&self, selector: &str) -> Option<Self> {
        let selector = parse_selector(selector)?;
        self.element.select(&selector).next().map(|element| HtmlRow {
            element,
            base: self.base,
        })
    }

    fn text(&self) -> String {
        let raw: String = self.element.text().collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!("Invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div class="issue-table-wrapper">
        <table id="issuetable">
          <thead><tr><th>Key</th></tr></thead>
          <tbody>
            <tr data-issuekey="A-1"><td class="issuekey"><a class="issue-link" href="/browse/A-1">A-1</a></td></tr>
            <tr data-issuekey="A-2"><td class="issuekey"><a class="issue-link" href="https://other.example.org/browse/A-2">A-2</a></td></tr>
          </tbody>
        </table>
        </div>
        <table><tbody><tr data-issuekey="NOT-1"></tr></tbody></table>
        </body></html>"#;

    #[test]
    fn test_rows_only_from_issue_table() {
        let table = IssueTable::parse(PAGE, None);
        let keys: Vec<_> = table
            .rows()
            .iter()
            .filter_map(|r| r.attribute("data-issuekey"))
            .collect();
        assert_eq!(keys, vec!["A-1", "A-2"]);
    }

    #[test]
    fn test_relative_href_resolved_against_page() {
        let table = IssueTable::parse(PAGE, Some("https://jira.example.com/issues/?jql=x"));
        let links: Vec<_> = table
            .rows()
            .iter()
            .filter_map(|r| r.find("a.issue-link"))
            .filter_map(|a| a.attribute("href"))
            .collect();
        assert_eq!(
            links,
            vec![
                "https://jira.example.com/browse/A-1",
                "https://other.example.org/browse/A-2",
            ]
        );
    }

    #[test]
    fn test_relative_href_kept_without_page_url() {
        let table = IssueTable::parse(PAGE, None);
        let link = table.rows()[0]
            .find("a.issue-link")
            .and_then(|a| a.attribute("href"));
        assert_eq!(link.as_deref(), Some("/browse/A-1"));
    }

    #[test]
    fn test_invalid_selector_is_absence() {
        let table = IssueTable::parse(PAGE, None);
        assert!(table.rows_matching("tr[[").is_empty());
        assert!(table.rows()[0].find("td..x").is_none());
    }

    #[test]
    fn test_text_collapses_whitespace() {
        let html = r#"<table id="issuetable"><tbody><tr data-issuekey="A-1">
            <td>  one
               <b>two</b>   three </td></tr></tbody></table>"#;
        let table = IssueTable::parse(html, None);
        assert_eq!(table.rows()[0].text(), "one two three");
    }
}
