//! 課題テーブルの列定義
//!
//! 列順は [`Field::ALL`] が唯一の定義元。抽出・集約・書式設定・出力のすべてがこれを参照する。

use serde::Serialize;

/// 課題1件が持つフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    IssueKey,
    IssueType,
    Link,
    Summary,
    Status,
    Priority,
    CustomerObjectId,
    Assignee,
    CreatedDate,
    Classification,
}

/// シート上での列の表示役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Text,
    Hyperlink,
    DateTime,
}

impl Field {
    pub const COUNT: usize = 10;

    /// 正規の列順
    pub const ALL: [Field; Field::COUNT] = [
        Field::IssueKey,
        Field::IssueType,
        Field::Link,
        Field::Summary,
        Field::Status,
        Field::Priority,
        Field::CustomerObjectId,
        Field::Assignee,
        Field::CreatedDate,
        Field::Classification,
    ];

    /// ヘッダー行に出力する列名
    pub fn header(self) -> &'static str {
        match self {
            Field::IssueKey => "Issue Key",
            Field::IssueType => "Issue Type",
            Field::Link => "Issue link",
            Field::Summary => "Summary",
            Field::Status => "Status",
            Field::Priority => "Priority",
            Field::CustomerObjectId => "Customer Object ID",
            Field::Assignee => "Assignee",
            Field::CreatedDate => "Created",
            Field::Classification => "Classification",
        }
    }

    pub fn role(self) -> ColumnRole {
        match self {
            Field::Link => ColumnRole::Hyperlink,
            Field::CreatedDate => ColumnRole::DateTime,
            _ => ColumnRole::Text,
        }
    }

    /// `Field::ALL` 内での位置
    pub fn index(self) -> usize {
        self as usize
    }
}

impl ColumnRole {
    /// この役割を持つ列のヘッダー名（なければ `None`）
    pub fn header(self) -> Option<&'static str> {
        Field::ALL
            .into_iter()
            .find(|f| f.role() == self)
            .map(Field::header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_index() {
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_headers_are_distinct() {
        let mut headers: Vec<_> = Field::ALL.into_iter().map(Field::header).collect();
        headers.sort_unstable();
        headers.dedup();
        assert_eq!(headers.len(), Field::COUNT);
    }

    #[test]
    fn test_role_headers() {
        assert_eq!(ColumnRole::Hyperlink.header(), Some("Issue link"));
        assert_eq!(ColumnRole::DateTime.header(), Some("Created"));
        assert_eq!(ColumnRole::Text.header(), Some("Issue Key"));
    }
}
