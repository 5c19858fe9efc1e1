//! Shape-checked inference over a shared classifier. Returns the raw
//! probability; thresholding belongs to the decision policy.

use super::Classifier;
use crate::error::{FeatureShapeError, InferenceError};
use crate::features::EncodedFeatureVector;
use std::sync::Arc;
use tracing::error;

#[derive(Clone)]
pub struct InferenceService {
    classifier: Arc<dyn Classifier>,
    expected_len: usize,
    model_id: Arc<str>,
}

impl InferenceService {
    pub fn new(classifier: Arc<dyn Classifier>, expected_len: usize, model_id: &str) -> Self {
        Self {
            classifier,
            expected_len,
            model_id: Arc::from(model_id),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    pub fn backend(&self) -> &'static str {
        self.classifier.backend()
    }

    pub fn predict(&self, vector: &EncodedFeatureVector) -> Result<f64, InferenceError> {
        if let Err(e) = self.check_shape(vector.as_slice()) {
            error!(model_id = %self.model_id, error = %e, "malformed feature vector reached inference");
            return Err(e.into());
        }
        let p = self.classifier.predict_probability(vector.as_slice())?;
        if !(0.0..=1.0).contains(&p) {
            error!(model_id = %self.model_id, probability = p, "classifier returned a non-probability");
            return Err(InferenceError::InvalidProbability(p));
        }
        Ok(p)
    }

    fn check_shape(&self, values: &[f32]) -> Result<(), FeatureShapeError> {
        if values.len() != self.expected_len {
            return Err(FeatureShapeError::Length {
                expected: self.expected_len,
                actual: values.len(),
            });
        }
        match values.iter().position(|v| !v.is_finite()) {
            Some(position) => Err(FeatureShapeError::NonFinite { position }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::DerivedFeatureSet;

    struct Fixed(f64);

    impl Classifier for Fixed {
        fn predict_probability(&self, _features: &[f32]) -> Result<f64, InferenceError> {
            Ok(self.0)
        }

        fn backend(&self) -> &'static str {
            "fixed"
        }
    }

    fn vector(values: Vec<f32>) -> EncodedFeatureVector {
        EncodedFeatureVector {
            values,
            derived: DerivedFeatureSet {
                is_zero_balance: false,
            },
        }
    }

    #[test]
    fn returns_raw_probability() {
        let svc = InferenceService::new(Arc::new(Fixed(0.7)), 3, "m");
        assert_eq!(svc.predict(&vector(vec![1.0, 2.0, 3.0])).unwrap(), 0.7);
    }

    #[test]
    fn wrong_length_is_rejected_before_the_classifier() {
        let svc = InferenceService::new(Arc::new(Fixed(0.7)), 17, "m");
        assert_eq!(
            svc.predict(&vector(vec![0.0; 16])),
            Err(InferenceError::Shape(FeatureShapeError::Length {
                expected: 17,
                actual: 16
            }))
        );
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let svc = InferenceService::new(Arc::new(Fixed(0.7)), 3, "m");
        assert_eq!(
            svc.predict(&vector(vec![0.0, f32::NAN, 1.0])),
            Err(InferenceError::Shape(FeatureShapeError::NonFinite { position: 1 }))
        );
    }

    #[test]
    fn out_of_range_output_is_an_inference_error() {
        let svc = InferenceService::new(Arc::new(Fixed(1.5)), 1, "m");
        assert_eq!(
            svc.predict(&vector(vec![0.0])),
            Err(InferenceError::InvalidProbability(1.5))
        );
        let svc = InferenceService::new(Arc::new(Fixed(f64::NAN)), 1, "m");
        assert!(matches!(
            svc.predict(&vector(vec![0.0])),
            Err(InferenceError::InvalidProbability(_))
        ));
    }

    #[test]
    fn concurrent_callers_share_one_classifier() {
        let svc = InferenceService::new(Arc::new(Fixed(0.25)), 2, "m");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                std::thread::spawn(move || svc.predict(&vector(vec![1.0, 0.0])).unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 0.25);
        }
    }
}
