//! Customer record schema and validation.
//!
//! [`RawRecord`] is whatever the caller sent. [`ValidatedRecord`] is the only
//! record type the feature deriver accepts, and only [`validate`] builds one.

pub mod fields;
mod validator;

pub use validator::validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped customer record as received (JSON object or CSV row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

impl RawRecord {
    /// Build a record from a CSV row. Empty cells become `null`, numeric cells
    /// become numbers, everything else stays text.
    pub fn from_csv_row(headers: &csv::StringRecord, row: &csv::StringRecord) -> Self {
        let mut obj = Map::with_capacity(headers.len());
        for (header, cell) in headers.iter().zip(row.iter()) {
            obj.insert(header.trim().to_string(), csv_cell(cell));
        }
        RawRecord(Value::Object(obj))
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }
}

impl From<Value> for RawRecord {
    fn from(v: Value) -> Self {
        RawRecord(v)
    }
}

fn csv_cell(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    match cell.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::String(cell.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geography {
    France,
    Germany,
    Spain,
}

impl Geography {
    /// Lexical order; the encoder relies on it.
    pub const NAMES: &'static [&'static str] = &["France", "Germany", "Spain"];

    pub fn as_str(self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Germany => "Germany",
            Geography::Spain => "Spain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "France" => Some(Geography::France),
            "Germany" => Some(Geography::Germany),
            "Spain" => Some(Geography::Spain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Lexical order; the encoder relies on it.
    pub const NAMES: &'static [&'static str] = &["Female", "Male"];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Female" => Some(Gender::Female),
            "Male" => Some(Gender::Male),
            _ => None,
        }
    }
}

/// Identifiers carried through untouched. Never used as features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

/// Record that passed schema validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRecord {
    pub credit_score: u16,
    pub age: u8,
    pub tenure: u8,
    pub balance: f64,
    pub num_of_products: u8,
    pub estimated_salary: f64,
    pub geography: Geography,
    pub gender: Gender,
    pub has_credit_card: bool,
    pub is_active_member: bool,
    pub customer: CustomerRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_lexically_sorted() {
        let mut geo = Geography::NAMES.to_vec();
        geo.sort_unstable();
        assert_eq!(geo, Geography::NAMES);
        let mut gender = Gender::NAMES.to_vec();
        gender.sort_unstable();
        assert_eq!(gender, Gender::NAMES);
    }

    #[test]
    fn names_round_trip_through_parse() {
        for name in Geography::NAMES {
            assert_eq!(Geography::parse(name).unwrap().as_str(), *name);
        }
        for name in Gender::NAMES {
            assert_eq!(Gender::parse(name).unwrap().as_str(), *name);
        }
        assert!(Geography::parse("france").is_none());
    }

    #[test]
    fn csv_cells_are_typed() {
        let headers = csv::StringRecord::from(vec!["CreditScore", "Geography", "Balance", "Age"]);
        let row = csv::StringRecord::from(vec!["619", "France", "0.0", ""]);
        let record = RawRecord::from_csv_row(&headers, &row);
        let obj = record.as_object().unwrap();
        assert_eq!(obj["CreditScore"], Value::from(619));
        assert_eq!(obj["Geography"], Value::from("France"));
        assert_eq!(obj["Balance"], Value::from(0.0));
        assert!(obj["Age"].is_null());
    }
}
