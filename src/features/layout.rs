//! Named-field-to-position contract between the deriver and the classifier.

use super::encoder::{CategoricalEncoder, CategoricalField, ENCODER_VERSION};
use crate::error::ConfigurationError;
use crate::schema::fields::NUMERIC_FIELDS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    version: &'static str,
    names: Vec<String>,
}

impl FeatureLayout {
    /// Layout produced by this build: numeric block, then one one-hot block per
    /// categorical field.
    pub fn current() -> Self {
        let encoder = CategoricalEncoder::new();
        let mut names: Vec<String> = NUMERIC_FIELDS.iter().map(|f| f.name().to_string()).collect();
        for field in CategoricalField::ALL {
            names.extend(encoder.feature_names(field));
        }
        Self {
            version: ENCODER_VERSION,
            names,
        }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Compare against the ordered feature names recorded with a trained
    /// artifact. Any drift is fatal.
    pub fn verify(&self, recorded: &[String]) -> Result<(), ConfigurationError> {
        if recorded.len() != self.names.len() {
            return Err(ConfigurationError::LayoutLength {
                expected: self.names.len(),
                found: recorded.len(),
            });
        }
        if let Some((position, (expected, found))) = self
            .names
            .iter()
            .zip(recorded)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(ConfigurationError::LayoutMismatch {
                position,
                expected: expected.clone(),
                found: found.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_layout_positions() {
        let layout = FeatureLayout::current();
        assert_eq!(layout.len(), 17);
        assert_eq!(layout.position("credit_score"), Some(0));
        assert_eq!(layout.position("estimated_salary"), Some(5));
        assert_eq!(layout.position("has_credit_card=0"), Some(6));
        assert_eq!(layout.position("gender=Male"), Some(11));
        assert_eq!(layout.position("geography=France"), Some(12));
        assert_eq!(layout.position("is_zero_balance=1"), Some(16));
        assert_eq!(layout.position("surname"), None);
        assert_eq!(layout.version(), "onehot-v1");
    }

    #[test]
    fn verify_accepts_identical_names() {
        let layout = FeatureLayout::current();
        layout.verify(&layout.names().to_vec()).unwrap();
    }

    #[test]
    fn verify_reports_first_swapped_position() {
        let layout = FeatureLayout::current();
        let mut recorded = layout.names().to_vec();
        recorded.swap(12, 13);
        match layout.verify(&recorded) {
            Err(ConfigurationError::LayoutMismatch {
                position,
                expected,
                found,
            }) => {
                assert_eq!(position, 12);
                assert_eq!(expected, "geography=France");
                assert_eq!(found, "geography=Germany");
            }
            other => panic!("expected layout mismatch, got {:?}", other),
        }
    }

    #[test]
    fn verify_reports_length_drift() {
        let layout = FeatureLayout::current();
        let recorded = layout.names()[..16].to_vec();
        assert!(matches!(
            layout.verify(&recorded),
            Err(ConfigurationError::LayoutLength {
                expected: 17,
                found: 16
            })
        ));
    }
}
