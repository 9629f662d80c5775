//! 行からのフィールド抽出
//!
//! フィールドごとの抽出方法は [`STRATEGIES`] の表で定義し、
//! 失敗時の扱い（ログ出力と空値への縮退）は [`extract`] に一本化している。

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::field::Field;
use crate::traits::RowElement;

/// 行に付与された課題キーの属性名
pub const ISSUE_KEY_ATTR: &str = "data-issuekey";

/// 抽出された値
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// UTCに変換済み（タイムゾーン情報なし）
    DateTime(NaiveDateTime),
}

impl FieldValue {
    pub fn empty() -> Self {
        FieldValue::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::DateTime(_) => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::empty()
    }
}

/// 1フィールドの抽出結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub value: FieldValue,
    /// 抽出に失敗して縮退値になった場合は `false`
    pub ok: bool,
}

#[derive(Error, Debug)]
enum ExtractError {
    #[error("element not found: {0}")]
    MissingElement(&'static str),

    #[error("attribute missing: {0}")]
    MissingAttribute(&'static str),

    #[error("unparsable timestamp: {raw}")]
    Unparsable { raw: String },
}

/// フィールド抽出方法
#[derive(Debug)]
enum Strategy {
    /// 行そのものの属性（空なら失敗）
    RowAttribute { attr: &'static str },
    /// セル内の子要素の属性
    NestedAttribute {
        cell: &'static str,
        inner: &'static str,
        attr: &'static str,
    },
    /// セル内の子要素のテキスト
    NestedText {
        cell: &'static str,
        inner: &'static str,
    },
    /// セルのテキスト
    CellText { cell: &'static str },
    /// 存在する最初の子要素のテキスト、どれもなければセルのテキスト
    Tiered {
        cell: &'static str,
        tiers: &'static [&'static str],
    },
    /// 子要素のISO-8601属性をUTCに変換
    Timestamp {
        cell: &'static str,
        inner: &'static str,
        attr: &'static str,
    },
}

static STRATEGIES: [(Field, Strategy); Field::COUNT] = [
    (
        Field::IssueKey,
        Strategy::RowAttribute {
            attr: ISSUE_KEY_ATTR,
        },
    ),
    (
        Field::IssueType,
        Strategy::NestedAttribute {
            cell: "td.issuetype",
            inner: "img",
            attr: "alt",
        },
    ),
    (
        Field::Link,
        Strategy::NestedAttribute {
            cell: "td.issuekey",
            inner: "a.issue-link",
            attr: "href",
        },
    ),
    (
        Field::Summary,
        Strategy::NestedText {
            cell: "td.summary",
            inner: "p",
        },
    ),
    (
        Field::Status,
        Strategy::NestedText {
            cell: "td.status",
            inner: "span",
        },
    ),
    (
        Field::Priority,
        Strategy::NestedAttribute {
            cell: "td.priority",
            inner: "img",
            attr: "alt",
        },
    ),
    (
        Field::CustomerObjectId,
        Strategy::CellText {
            cell: "td.customfield_14400",
        },
    ),
    (
        Field::Assignee,
        Strategy::Tiered {
            cell: "td.assignee",
            tiers: &["em", "a.user-hover"],
        },
    ),
    (
        Field::CreatedDate,
        Strategy::Timestamp {
            cell: "td.created",
            inner: "time",
            attr: "datetime",
        },
    ),
    (
        Field::Classification,
        Strategy::CellText {
            cell: "td.customfield_15400",
        },
    ),
];

fn strategy_for(field: Field) -> &'static Strategy {
    let (owner, strategy) = &STRATEGIES[field.index()];
    debug_assert_eq!(*owner, field);
    strategy
}

impl Strategy {
    fn apply<R: RowElement>(&self, row: &R) -> Result<FieldValue, ExtractError> {
        match *self {
            Strategy::RowAttribute { attr } => row
                .attribute(attr)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(FieldValue::Text)
                .ok_or(ExtractError::MissingAttribute(attr)),
            Strategy::NestedAttribute { cell, inner, attr } => {
                let element = find(&find(row, cell)?, inner)?;
                element
                    .attribute(attr)
                    .map(|v| FieldValue::Text(v.trim().to_string()))
                    .ok_or(ExtractError::MissingAttribute(attr))
            }
            Strategy::NestedText { cell, inner } => {
                let element = find(&find(row, cell)?, inner)?;
                Ok(FieldValue::Text(element.text()))
            }
            Strategy::CellText { cell } => Ok(FieldValue::Text(find(row, cell)?.text())),
            Strategy::Tiered { cell, tiers } => {
                let cell = find(row, cell)?;
                // 要素が「存在しない」場合のみ次の段へ進む（空テキストでも採用）
                let text = tiers
                    .iter()
                    .find_map(|selector| cell.find(selector))
                    .map(|element| element.text())
                    .unwrap_or_else(|| cell.text());
                Ok(FieldValue::Text(text))
            }
            Strategy::Timestamp { cell, inner, attr } => {
                let element = find(&find(row, cell)?, inner)?;
                let raw = element
                    .attribute(attr)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ExtractError::MissingAttribute(attr))?;
                parse_timestamp(&raw)
                    .map(FieldValue::DateTime)
                    .ok_or(ExtractError::Unparsable { raw })
            }
        }
    }
}

fn find<R: RowElement>(parent: &R, selector: &'static str) -> Result<R, ExtractError> {
    parent
        .find(selector)
        .ok_or(ExtractError::MissingElement(selector))
}

/// 1フィールドを抽出する。失敗しても呼び出し側にエラーは返さない。
///
/// 失敗時は空文字列に縮退する。`CreatedDate` の日時変換に失敗した場合のみ、
/// 元の属性文字列をそのまま値として残す。
pub fn extract<R: RowElement>(row: &R, field: Field) -> Extraction {
    match strategy_for(field).apply(row) {
        Ok(value) => Extraction { value, ok: true },
        Err(e) => {
            let issue_key = row.attribute(ISSUE_KEY_ATTR).unwrap_or_default();
            if field == Field::IssueKey {
                // キーのない行は集計対象外として黙って捨てる
                debug!("Row without issue key: {}", e);
            } else {
                warn!("Failed to extract {:?} for issue {}: {}", field, issue_key, e);
            }

            let value = match e {
                ExtractError::Unparsable { raw } => FieldValue::Text(raw),
                _ => FieldValue::empty(),
            };
            Extraction { value, ok: false }
        }
    }
}

// `%#z` は `Z`・`+09`・`+0900`・`+09:00` のいずれも受け付ける
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y%m%dT%H%M%S%.f%#z",
];
const NAIVE_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// ISO-8601文字列をUTCの日時（タイムゾーンなし）に変換する
///
/// オフセットのない文字列はUTCとみなすため、変換結果を再度渡しても同じ値になる。
/// 日付のみの場合は0時とする。
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    // Jira は `+0900` 形式（コロンなし）のオフセットを出力する
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_utc());
        }
    }
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}
