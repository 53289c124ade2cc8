//! Typed car read model.
//!
//! # Responsibility
//! - Give callers a struct view over fully projected car rows.
//! - Build the write field map for a new car.
//!
//! # Invariants
//! - `id` is storage-assigned and never appears in write field maps.
//! - Unrecognized persisted color codes decode to white.

use crate::contract::{self, CarColor};
use crate::store::{FieldMap, RowSet, StoreError, StoreResult, Value};
use serde::{Deserialize, Serialize};

/// One persisted car row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    /// Free text by contract; "2015" and "mid-90s" are both valid.
    pub year: String,
    pub color: CarColor,
    pub plate: String,
}

impl Car {
    /// Builds the insert field map for a new car that has no id yet.
    pub fn draft(make: &str, model: &str, year: &str, color: CarColor, plate: &str) -> FieldMap {
        let mut values = FieldMap::new();
        values.set_text(contract::COL_MAKE, make);
        values.set_text(contract::COL_MODEL, model);
        values.set_text(contract::COL_YEAR, year);
        values.set_int(contract::COL_COLOR, color.code());
        values.set_text(contract::COL_PLATE, plate);
        values
    }

    /// The field map representing this car's non-id columns.
    pub fn values(&self) -> FieldMap {
        Self::draft(&self.make, &self.model, &self.year, self.color, &self.plate)
    }

    /// Parses every row of a fully projected row set.
    ///
    /// Fails when the projection is missing a contract column or a cell
    /// holds the wrong type for it.
    pub fn from_row_set(rows: &RowSet) -> StoreResult<Vec<Car>> {
        (0..rows.len()).map(|row| Self::parse_row(rows, row)).collect()
    }

    fn parse_row(rows: &RowSet, row: usize) -> StoreResult<Car> {
        Ok(Car {
            id: int_cell(rows, row, contract::COL_ID)?,
            make: text_cell(rows, row, contract::COL_MAKE)?,
            model: text_cell(rows, row, contract::COL_MODEL)?,
            year: text_cell(rows, row, contract::COL_YEAR)?,
            color: CarColor::from_code(int_cell(rows, row, contract::COL_COLOR)?),
            plate: text_cell(rows, row, contract::COL_PLATE)?,
        })
    }
}

fn text_cell(rows: &RowSet, row: usize, column: &str) -> StoreResult<String> {
    match rows.value(row, column) {
        Some(Value::Text(text)) => Ok(text.clone()),
        Some(other) => Err(StoreError::InvalidArgument(format!(
            "column `{column}` holds {other:?}, expected text"
        ))),
        None => Err(StoreError::InvalidArgument(format!(
            "column `{column}` is not part of this row set"
        ))),
    }
}

fn int_cell(rows: &RowSet, row: usize, column: &str) -> StoreResult<i64> {
    match rows.value(row, column) {
        Some(Value::Integer(value)) => Ok(*value),
        Some(other) => Err(StoreError::InvalidArgument(format!(
            "column `{column}` holds {other:?}, expected an integer"
        ))),
        None => Err(StoreError::InvalidArgument(format!(
            "column `{column}` is not part of this row set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::Car;
    use crate::contract::{self, CarColor};
    use crate::store::Value;

    #[test]
    fn draft_covers_every_writable_column() {
        let values = Car::draft("Ford", "F150", "2015", CarColor::Red, "ABC123");
        for column in contract::WRITABLE_COLUMNS {
            assert!(values.contains(column), "column {column} missing from draft");
        }
        assert!(!values.contains(contract::COL_ID));
        assert!(matches!(
            values.get(contract::COL_COLOR),
            Some(Value::Integer(code)) if *code == CarColor::Red.code()
        ));
    }

    #[test]
    fn car_serializes_with_snake_case_color() {
        let car = Car {
            id: 1,
            make: "Ford".to_string(),
            model: "F150".to_string(),
            year: "2015".to_string(),
            color: CarColor::Red,
            plate: "ABC123".to_string(),
        };
        let json = serde_json::to_string(&car).unwrap();
        assert!(json.contains("\"color\":\"red\""));
        let back: Car = serde_json::from_str(&json).unwrap();
        assert_eq!(back, car);
    }
}
