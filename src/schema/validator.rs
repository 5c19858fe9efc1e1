//! Raw record → ValidatedRecord. Pure check; the first violation wins.

use super::fields::{self, FieldSpec, NumericField};
use super::{CustomerRef, Gender, Geography, RawRecord, ValidatedRecord};
use crate::error::{UnknownCategoryError, ValidationError};
use serde_json::{Map, Value};

pub fn validate(record: &RawRecord) -> Result<ValidatedRecord, ValidationError> {
    let obj = record.as_object().ok_or(ValidationError::NotAnObject)?;

    let credit_score = numeric(obj, &fields::CREDIT_SCORE)?;
    let age = numeric(obj, &fields::AGE)?;
    let tenure = numeric(obj, &fields::TENURE)?;
    let balance = numeric(obj, &fields::BALANCE)?;
    let num_of_products = numeric(obj, &fields::NUM_OF_PRODUCTS)?;
    let estimated_salary = numeric(obj, &fields::ESTIMATED_SALARY)?;
    let geography = categorical(obj, &fields::GEOGRAPHY, Geography::NAMES, Geography::parse)?;
    let gender = categorical(obj, &fields::GENDER, Gender::NAMES, Gender::parse)?;
    let has_credit_card = numeric(obj, &fields::HAS_CREDIT_CARD)?;
    let is_active_member = numeric(obj, &fields::IS_ACTIVE_MEMBER)?;

    if let Some(supplied) = fields::IS_ZERO_BALANCE.lookup(obj) {
        let recomputed = balance == 0.0;
        let claimed = matches!(supplied, Value::Bool(true))
            || supplied.as_f64().map_or(false, |v| v == 1.0);
        if claimed != recomputed {
            tracing::debug!(supplied = %supplied, balance, "ignoring supplied is_zero_balance");
        }
    }

    // Ranges are checked above, so the narrowing casts are lossless.
    Ok(ValidatedRecord {
        credit_score: credit_score as u16,
        age: age as u8,
        tenure: tenure as u8,
        balance,
        num_of_products: num_of_products as u8,
        estimated_salary,
        geography,
        gender,
        has_credit_card: has_credit_card == 1.0,
        is_active_member: is_active_member == 1.0,
        customer: CustomerRef {
            row_id: identifier(obj, &fields::ROW_ID),
            customer_id: identifier(obj, &fields::CUSTOMER_ID),
            surname: identifier(obj, &fields::SURNAME),
        },
    })
}

fn numeric(obj: &Map<String, Value>, field: &NumericField) -> Result<f64, ValidationError> {
    let raw = field
        .spec
        .lookup(obj)
        .ok_or(ValidationError::MissingField { field: field.name() })?;

    let out_of_range = || ValidationError::Range {
        field: field.name(),
        value: raw.to_string(),
        expected_range: field.range,
    };

    let value = match raw {
        Value::Number(n) => n.as_f64().ok_or_else(out_of_range)?,
        Value::Bool(b) if field.accepts_bool => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return Err(out_of_range()),
    };

    let range = field.range;
    if !value.is_finite() || value < range.min || value > range.max {
        return Err(out_of_range());
    }
    if range.integer && value.fract() != 0.0 {
        return Err(out_of_range());
    }
    Ok(value)
}

fn categorical<T>(
    obj: &Map<String, Value>,
    field: &FieldSpec,
    allowed: &'static [&'static str],
    parse: fn(&str) -> Option<T>,
) -> Result<T, ValidationError> {
    let raw = field
        .lookup(obj)
        .ok_or(ValidationError::MissingField { field: field.name })?;
    let parsed = match raw {
        Value::String(s) => parse(s),
        _ => None,
    };
    parsed.ok_or_else(|| {
        let value = match raw {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        UnknownCategoryError {
            field: field.name,
            value,
            allowed: allowed.to_vec(),
        }
        .into()
    })
}

fn identifier(obj: &Map<String, Value>, field: &FieldSpec) -> Option<String> {
    field.lookup(obj).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
