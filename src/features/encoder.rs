//! Versioned one-hot encoding for categorical fields.
//!
//! Categories within a field are in lexical order, matching the encoder the
//! classifier was fitted with. Any change to fields, categories or ordering
//! must bump [`ENCODER_VERSION`].

use crate::error::UnknownCategoryError;
use crate::schema::{Gender, Geography};

pub const ENCODER_VERSION: &str = "onehot-v1";

const FLAG: &[&str] = &["0", "1"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    HasCreditCard,
    IsActiveMember,
    Gender,
    Geography,
    IsZeroBalance,
}

impl CategoricalField {
    /// Fields in feature-vector order.
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::HasCreditCard,
        CategoricalField::IsActiveMember,
        CategoricalField::Gender,
        CategoricalField::Geography,
        CategoricalField::IsZeroBalance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::HasCreditCard => "has_credit_card",
            CategoricalField::IsActiveMember => "is_active_member",
            CategoricalField::Gender => "gender",
            CategoricalField::Geography => "geography",
            CategoricalField::IsZeroBalance => "is_zero_balance",
        }
    }

    pub fn categories(self) -> &'static [&'static str] {
        match self {
            CategoricalField::HasCreditCard
            | CategoricalField::IsActiveMember
            | CategoricalField::IsZeroBalance => FLAG,
            CategoricalField::Gender => Gender::NAMES,
            CategoricalField::Geography => Geography::NAMES,
        }
    }
}

/// Category label for a binary flag.
pub fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Stateless lookup; cheap to copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalEncoder;

impl CategoricalEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn version(&self) -> &'static str {
        ENCODER_VERSION
    }

    /// Position of `value` among the field's categories.
    pub fn encode(&self, field: CategoricalField, value: &str) -> Result<usize, UnknownCategoryError> {
        let categories = field.categories();
        categories
            .iter()
            .position(|c| *c == value)
            .ok_or_else(|| UnknownCategoryError {
                field: field.name(),
                value: value.to_string(),
                allowed: categories.to_vec(),
            })
    }

    pub fn width(&self, field: CategoricalField) -> usize {
        field.categories().len()
    }

    /// Append the one-hot block for `value` to `out`.
    pub fn one_hot_into(
        &self,
        field: CategoricalField,
        value: &str,
        out: &mut Vec<f32>,
    ) -> Result<(), UnknownCategoryError> {
        let hot = self.encode(field, value)?;
        out.extend((0..self.width(field)).map(|i| if i == hot { 1.0 } else { 0.0 }));
        Ok(())
    }

    /// Column names for the field's one-hot block, e.g. `geography=Spain`.
    pub fn feature_names(&self, field: CategoricalField) -> impl Iterator<Item = String> {
        let name = field.name();
        field
            .categories()
            .iter()
            .map(move |c| format!("{}={}", name, c))
    }
}
