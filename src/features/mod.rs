//! Feature preparation: derived features, categorical encoding, ordered vector.

mod deriver;
mod encoder;
mod layout;

pub use deriver::{FeatureDeriver, Standardization};
pub use encoder::{flag, CategoricalEncoder, CategoricalField, ENCODER_VERSION};
pub use layout::FeatureLayout;

use crate::schema::ValidatedRecord;
use serde::{Deserialize, Serialize};

/// Features computed from the record rather than read from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFeatureSet {
    /// `balance == 0`, recomputed on every request.
    pub is_zero_balance: bool,
}

impl DerivedFeatureSet {
    pub fn from_record(record: &ValidatedRecord) -> Self {
        Self {
            is_zero_balance: record.balance == 0.0,
        }
    }
}

/// Model input in [`FeatureLayout`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedFeatureVector {
    pub values: Vec<f32>,
    pub derived: DerivedFeatureSet,
}

impl EncodedFeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
