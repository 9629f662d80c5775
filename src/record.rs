//! 行 → Record、行の列 → Dataset の組み立て

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, info};

use crate::extract::{extract, FieldValue};
use crate::field::Field;
use crate::traits::RowElement;

/// 1行分の正規化済みデータ（`Field::ALL` の順）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    values: [FieldValue; Field::COUNT],
}

impl Record {
    pub fn get(&self, field: Field) -> &FieldValue {
        &self.values[field.index()]
    }

    pub fn key(&self) -> &str {
        self.get(Field::IssueKey).as_text().unwrap_or_default()
    }

    /// `Field::ALL` の順に値を返す
    pub fn values(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        Field::ALL.into_iter().zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::COUNT))?;
        for (field, value) in self.values() {
            map.serialize_entry(field.header(), value)?;
        }
        map.end()
    }
}

/// 行からRecordを組み立てる。課題キーが取れない行は `None`。
pub fn assemble<R: RowElement>(row: &R) -> Option<Record> {
    let key = extract(row, Field::IssueKey);
    if !key.ok || key.value.is_empty() {
        return None;
    }

    let mut values: [FieldValue; Field::COUNT] = Default::default();
    values[Field::IssueKey.index()] = key.value;
    for field in Field::ALL.into_iter().skip(1) {
        values[field.index()] = extract(row, field).value;
    }

    Some(Record { values })
}

/// 1クエリ分の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    name: String,
    records: Vec<Record>,
}

impl Dataset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 全行をRecordに変換し、元の行順のままDatasetにまとめる
pub fn build<R, I>(name: impl Into<String>, rows: I) -> Dataset
where
    R: RowElement,
    I: IntoIterator<Item = R>,
{
    let name = name.into();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        match assemble(&row) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("{}: skipped {} rows without issue key", name, skipped);
    }
    info!("{}: found {} issues", name, records.len());

    Dataset { name, records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::IssueTable;

    const TABLE: &str = r#"<table id="issuetable"><tbody>
        <tr data-issuekey="A-1"><td class="summary"><p>first</p></td><td class="priority"></td></tr>
        <tr><td class="summary"><p>headerless junk</p></td></tr>
        <tr data-issuekey="A-2"><td class="summary"><p>second</p></td></tr>
        <tr data-issuekey=""><td class="summary"><p>blank key</p></td></tr>
        <tr data-issuekey="A-3"></tr>
        </tbody></table>"#;

    #[test]
    fn test_assemble_rejects_row_without_key() {
        let table = IssueTable::parse(TABLE, None);
        let rows = table.rows();
        assert!(assemble(&rows[1]).is_none());
        assert!(assemble(&rows[3]).is_none());
    }

    #[test]
    fn test_assemble_defaults_failed_fields_to_empty() {
        let table = IssueTable::parse(TABLE, None);
        let record = assemble(&table.rows()[0]).expect("keyed row");

        assert_eq!(record.key(), "A-1");
        assert_eq!(record.get(Field::Summary), &FieldValue::Text("first".into()));
        for field in Field::ALL.into_iter().filter(|f| !matches!(f, Field::IssueKey | Field::Summary)) {
            assert!(record.get(field).is_empty(), "{:?}", field);
        }
    }

    #[test]
    fn test_build_keeps_keyed_rows_in_order() {
        let table = IssueTable::parse(TABLE, None);
        let dataset = build("OPEN", table.rows());

        assert_eq!(dataset.name(), "OPEN");
        assert_eq!(dataset.len(), 3);
        let keys: Vec<_> = dataset.records().iter().map(Record::key).collect();
        assert_eq!(keys, vec!["A-1", "A-2", "A-3"]);
    }

    #[test]
    fn test_build_empty() {
        let table = IssueTable::parse("<html><body>No issues</body></html>", None);
        let dataset = build("CLOSED", table.rows());
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_record_serializes_by_header() {
        let table = IssueTable::parse(TABLE, None);
        let record = assemble(&table.rows()[2]).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["Issue Key"], "A-2");
        assert_eq!(json["Summary"], "second");
        assert_eq!(json["Created"], "");
        assert_eq!(json.as_object().unwrap().len(), Field::COUNT);
    }
}
