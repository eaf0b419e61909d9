use arrow::{
    array::{ArrayRef, Float64Builder, StringBuilder},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::sync::Arc;

use super::normalize::PERCENT_ROSTERED;
use crate::position::PositionCode;

/// A single canonical cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Null,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

/// One output row: canonical field name → value, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRecord {
    fields: Vec<(String, Value)>,
}

impl NormalizedRecord {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// All canonical rows for one position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionDataset {
    pub position: PositionCode,
    /// Canonical header; kept even when there are no records.
    pub columns: Vec<String>,
    pub records: Vec<NormalizedRecord>,
}

impl PositionDataset {
    pub fn new(position: PositionCode, columns: Vec<String>) -> Self {
        Self {
            position,
            columns,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Arrow schema: `percent_rostered` is Float64, everything else Utf8.
    pub fn arrow_schema(&self) -> Arc<Schema> {
        let fields: Vec<Field> = self
            .columns
            .iter()
            .map(|name| Field::new(name, column_type(name), true))
            .collect();
        Arc::new(Schema::new(fields))
    }

    /// Column-major copy of the records, ready for the CSV writer.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let schema = self.arrow_schema();
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let cells = self.records.iter().map(|r| r.get(name));
            match column_type(name) {
                DataType::Float64 => {
                    let mut b = Float64Builder::with_capacity(self.records.len());
                    for cell in cells {
                        b.append_option(cell.and_then(Value::as_f64));
                    }
                    arrays.push(Arc::new(b.finish()));
                }
                _ => {
                    let mut b = StringBuilder::new();
                    for cell in cells {
                        match cell {
                            Some(Value::Text(s)) => b.append_value(s),
                            Some(Value::Number(n)) => b.append_value(n.to_string()),
                            Some(Value::Null) | None => b.append_null(),
                        }
                    }
                    arrays.push(Arc::new(b.finish()));
                }
            }
        }

        RecordBatch::try_new(schema, arrays)
    }
}

fn column_type(name: &str) -> DataType {
    if name == PERCENT_ROSTERED {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, StringArray};

    fn record(player: &str, rost: Option<f64>) -> NormalizedRecord {
        NormalizedRecord::new(vec![
            ("player".to_string(), player.into()),
            ("games_played".to_string(), "17".into()),
            (
                PERCENT_ROSTERED.to_string(),
                rost.map(Value::Number).unwrap_or(Value::Null),
            ),
        ])
    }

    #[test]
    fn test_record_batch_types() {
        let mut ds = PositionDataset::new(
            PositionCode::WR,
            vec![
                "player".to_string(),
                "games_played".to_string(),
                PERCENT_ROSTERED.to_string(),
            ],
        );
        ds.records.push(record("A. Receiver", Some(87.5)));
        ds.records.push(record("B. Receiver", None));

        let batch = ds.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(2).data_type(), &DataType::Float64);

        let names = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(names.value(1), "B. Receiver");

        let rost = batch
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(rost.value(0), 87.5);
        assert!(rost.is_null(1));
    }

    #[test]
    fn test_record_batch_matches_cells_by_name() {
        let mut ds = PositionDataset::new(
            PositionCode::TE,
            vec![
                "player".to_string(),
                "games_played".to_string(),
                PERCENT_ROSTERED.to_string(),
            ],
        );
        ds.records.push(NormalizedRecord::new(vec![
            (PERCENT_ROSTERED.to_string(), Value::Number(41.5)),
            ("player".to_string(), "T. End".into()),
        ]));

        let batch = ds.to_record_batch().unwrap();
        let names = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(names.value(0), "T. End");
        assert!(batch.column(1).is_null(0));
        let rost = batch
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(rost.value(0), 41.5);
    }

    #[test]
    fn test_empty_batch_keeps_schema() {
        let ds = PositionDataset::new(PositionCode::K, vec!["player".to_string()]);
        let batch = ds.to_record_batch().unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.schema().field(0).name(), "player");
    }
}
