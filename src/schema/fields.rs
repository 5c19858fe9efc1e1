//! Declared customer schema: canonical field names, accepted aliases, ranges.
//!
//! Aliases cover the camelCase columns of the training notebooks and the
//! headers of the public bank-churn CSV export.

use crate::error::ExpectedRange;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    /// First non-null value under the canonical name or any alias.
    pub fn lookup<'a>(&self, obj: &'a Map<String, Value>) -> Option<&'a Value> {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .filter_map(|key| obj.get(key))
            .find(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub spec: FieldSpec,
    pub range: ExpectedRange,
    /// `true`/`false` are read as 1/0.
    pub accepts_bool: bool,
}

impl NumericField {
    pub fn name(&self) -> &'static str {
        self.spec.name
    }
}

const fn numeric(
    name: &'static str,
    aliases: &'static [&'static str],
    min: f64,
    max: f64,
    integer: bool,
) -> NumericField {
    NumericField {
        spec: FieldSpec { name, aliases },
        range: ExpectedRange { min, max, integer },
        accepts_bool: false,
    }
}

const fn flag(name: &'static str, aliases: &'static [&'static str]) -> NumericField {
    NumericField {
        spec: FieldSpec { name, aliases },
        range: ExpectedRange {
            min: 0.0,
            max: 1.0,
            integer: true,
        },
        accepts_bool: true,
    }
}

pub const CREDIT_SCORE: NumericField =
    numeric("credit_score", &["creditScore", "CreditScore"], 350.0, 850.0, true);
pub const AGE: NumericField = numeric("age", &["Age"], 18.0, 92.0, true);
pub const TENURE: NumericField = numeric("tenure", &["Tenure"], 0.0, 10.0, true);
pub const BALANCE: NumericField = numeric("balance", &["Balance"], 0.0, f64::INFINITY, false);
pub const NUM_OF_PRODUCTS: NumericField = numeric(
    "num_of_products",
    &["numofProducts", "numOfProducts", "NumOfProducts"],
    1.0,
    4.0,
    true,
);
pub const ESTIMATED_SALARY: NumericField = numeric(
    "estimated_salary",
    &["estimatedSalary", "EstimatedSalary"],
    11.58,
    199_992.0,
    false,
);
pub const HAS_CREDIT_CARD: NumericField =
    flag("has_credit_card", &["hasCrCard", "HasCrCard"]);
pub const IS_ACTIVE_MEMBER: NumericField =
    flag("is_active_member", &["isActiveMember", "IsActiveMember"]);

pub const GEOGRAPHY: FieldSpec = FieldSpec {
    name: "geography",
    aliases: &["Geography"],
};
pub const GENDER: FieldSpec = FieldSpec {
    name: "gender",
    aliases: &["Gender"],
};

pub const ROW_ID: FieldSpec = FieldSpec {
    name: "row_id",
    aliases: &["rowNumber", "RowNumber"],
};
pub const CUSTOMER_ID: FieldSpec = FieldSpec {
    name: "customer_id",
    aliases: &["customerId", "CustomerId"],
};
pub const SURNAME: FieldSpec = FieldSpec {
    name: "surname",
    aliases: &["Surname"],
};

/// Derived field; read only to notice stale or spoofed values.
pub const IS_ZERO_BALANCE: FieldSpec = FieldSpec {
    name: "is_zero_balance",
    aliases: &["isZeroBalance", "IsZeroBalance"],
};

/// Numeric fields in model order.
pub const NUMERIC_FIELDS: [NumericField; 6] = [
    CREDIT_SCORE,
    AGE,
    TENURE,
    BALANCE,
    NUM_OF_PRODUCTS,
    ESTIMATED_SALARY,
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_prefers_first_non_null_alias() {
        let obj = json!({ "credit_score": null, "CreditScore": 600 });
        let obj = obj.as_object().unwrap();
        assert_eq!(CREDIT_SCORE.spec.lookup(obj), Some(&json!(600)));
    }

    #[test]
    fn lookup_missing_and_null_are_absent() {
        let obj = json!({ "age": null });
        assert!(AGE.spec.lookup(obj.as_object().unwrap()).is_none());
        assert!(TENURE.spec.lookup(obj.as_object().unwrap()).is_none());
    }
}
