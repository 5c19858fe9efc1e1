//! ValidatedRecord → EncodedFeatureVector.

use super::encoder::{flag, CategoricalEncoder, CategoricalField};
use super::layout::FeatureLayout;
use super::{DerivedFeatureSet, EncodedFeatureVector};
use crate::error::{ConfigurationError, UnknownCategoryError};
use crate::schema::fields::NUMERIC_FIELDS;
use crate::schema::ValidatedRecord;
use serde::{Deserialize, Serialize};

/// Training-time standard scaling for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardization {
    pub mean: f64,
    pub scale: f64,
}

impl Standardization {
    pub fn apply(&self, x: f64) -> f64 {
        (x - self.mean) / self.scale
    }
}

pub struct FeatureDeriver {
    encoder: CategoricalEncoder,
    layout: FeatureLayout,
    scaling: Option<[Standardization; NUMERIC_FIELDS.len()]>,
}

impl FeatureDeriver {
    /// Deriver that passes numeric fields through unscaled.
    pub fn new() -> Self {
        Self {
            encoder: CategoricalEncoder::new(),
            layout: FeatureLayout::current(),
            scaling: None,
        }
    }

    /// Deriver applying per-column scaling, one entry per numeric field in
    /// model order.
    pub fn with_scaling(scaling: &[Standardization]) -> Result<Self, ConfigurationError> {
        if scaling.len() != NUMERIC_FIELDS.len() {
            return Err(ConfigurationError::InvalidScaling {
                feature: "numeric_scaling".to_string(),
                reason: format!(
                    "expected {} entries, found {}",
                    NUMERIC_FIELDS.len(),
                    scaling.len()
                ),
            });
        }
        let mut out = [Standardization {
            mean: 0.0,
            scale: 1.0,
        }; NUMERIC_FIELDS.len()];
        for (i, (s, field)) in scaling.iter().zip(NUMERIC_FIELDS.iter()).enumerate() {
            if !s.mean.is_finite() || !s.scale.is_finite() || s.scale == 0.0 {
                return Err(ConfigurationError::InvalidScaling {
                    feature: field.name().to_string(),
                    reason: format!("mean {} scale {}", s.mean, s.scale),
                });
            }
            out[i] = *s;
        }
        Ok(Self {
            scaling: Some(out),
            ..Self::new()
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn is_scaled(&self) -> bool {
        self.scaling.is_some()
    }

    pub fn derive(&self, record: &ValidatedRecord) -> Result<EncodedFeatureVector, UnknownCategoryError> {
        let derived = DerivedFeatureSet::from_record(record);
        let mut values = Vec::with_capacity(self.layout.len());

        let numeric = [
            f64::from(record.credit_score),
            f64::from(record.age),
            f64::from(record.tenure),
            record.balance,
            f64::from(record.num_of_products),
            record.estimated_salary,
        ];
        for (i, x) in numeric.into_iter().enumerate() {
            let x = match &self.scaling {
                Some(s) => s[i].apply(x),
                None => x,
            };
            values.push(x as f32);
        }

        for field in CategoricalField::ALL {
            let category = match field {
                CategoricalField::HasCreditCard => flag(record.has_credit_card),
                CategoricalField::IsActiveMember => flag(record.is_active_member),
                CategoricalField::Gender => record.gender.as_str(),
                CategoricalField::Geography => record.geography.as_str(),
                CategoricalField::IsZeroBalance => flag(derived.is_zero_balance),
            };
            self.encoder.one_hot_into(field, category, &mut values)?;
        }

        debug_assert_eq!(values.len(), self.layout.len());
        Ok(EncodedFeatureVector { values, derived })
    }
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new()
    }
}
