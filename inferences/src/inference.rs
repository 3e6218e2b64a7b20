use std::collections::BTreeMap;
use std::path::Path;

use chrono::Datelike;
use thiserror::Error;
use tract_onnx::prelude::*;

use crate::types::{Condition, HousePredictionRequest, Location, PredictionResponse};

/// Numeric features, then one-hot location, then one-hot condition.
pub const FEATURE_COUNT: usize = 5 + Location::ALL.len() + Condition::ALL.len();

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to load model from {path}: {source}")]
    ModelLoad { path: String, source: TractError },

    #[error("model execution failed: {0}")]
    Runtime(#[from] TractError),

    #[error("model produced no output")]
    EmptyOutput,

    #[error("model produced an invalid price: {0}")]
    InvalidOutput(f64),

    #[error("batch returned {actual} predictions for {expected} requests")]
    BatchLength { expected: usize, actual: usize },
}

/// Anything able to price a validated request.
///
/// Implementations must be pure from the caller's point of view: the same
/// request always yields the same price.
pub trait PricePredictor: Send + Sync {
    fn predict_price(&self, request: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError>;

    /// Prices every request in order. The first failure aborts the batch.
    fn batch_predict(
        &self,
        requests: &[HousePredictionRequest],
    ) -> Result<Vec<PredictionResponse>, InferenceError> {
        requests.iter().map(|r| self.predict_price(r)).collect()
    }
}

/// Relative weight of each input group in the trained model. Sums to 1.
pub const FEATURE_IMPORTANCE: [(&str, f64); 6] = [
    ("sqft", 0.43),
    ("location", 0.27),
    ("bathrooms", 0.15),
    ("bedrooms", 0.08),
    ("house_age", 0.05),
    ("condition", 0.02),
];

pub fn feature_importance() -> BTreeMap<String, f64> {
    FEATURE_IMPORTANCE
        .iter()
        .map(|(name, weight)| (name.to_string(), *weight))
        .collect()
}

/// Flattens a request into the model's input row.
pub fn encode_features(request: &HousePredictionRequest, current_year: i32) -> [f32; FEATURE_COUNT] {
    let mut row = [0f32; FEATURE_COUNT];

    let house_age = (current_year - request.year_built).max(0) as f32;
    let bed_bath_ratio = if request.bathrooms > 0.0 {
        request.bedrooms as f64 / request.bathrooms
    } else {
        0.0
    };

    row[0] = request.sqft as f32;
    row[1] = request.bedrooms as f32;
    row[2] = request.bathrooms as f32;
    row[3] = house_age;
    row[4] = bed_bath_ratio as f32;

    let loc_offset = 5;
    if let Some(i) = Location::ALL.iter().position(|l| *l == request.location) {
        row[loc_offset + i] = 1.0;
    }
    let cond_offset = loc_offset + Location::ALL.len();
    if let Some(i) = Condition::ALL.iter().position(|c| *c == request.condition) {
        row[cond_offset + i] = 1.0;
    }

    row
}

/// ONNX regression model taking a `[1, FEATURE_COUNT]` f32 row and returning
/// one price.
pub struct OnnxPriceModel {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>,
}

impl OnnxPriceModel {
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, InferenceError> {
        let path = model_path.as_ref();
        let model = Self::build_plan(path).map_err(|source| InferenceError::ModelLoad {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded price model from {}", path.display());
        Ok(Self { model })
    }

    fn build_plan(
        path: &Path,
    ) -> TractResult<SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>> {
        tract_onnx::onnx()
            .model_for_path(path)?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT)),
            )?
            .into_optimized()?
            .into_runnable()
    }

    fn run_row(&self, row: &[f32; FEATURE_COUNT]) -> Result<f64, InferenceError> {
        let input = Tensor::from_shape(&[1, FEATURE_COUNT], &row[..])?;
        let outputs = self.model.run(tvec!(input.into()))?;
        let first = outputs
            .first()
            .ok_or(InferenceError::EmptyOutput)?
            .to_array_view::<f32>()?
            .iter()
            .next()
            .copied()
            .ok_or(InferenceError::EmptyOutput)?;
        Ok(first as f64)
    }
}

impl PricePredictor for OnnxPriceModel {
    fn predict_price(&self, request: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError> {
        let now = chrono::Utc::now();
        let row = encode_features(request, now.year());
        let price = self.run_row(&row)?;
        log::debug!("Predicted {:.2} for {:?}", price, request.location);
        PredictionResponse::from_price(price, now.to_rfc3339())
            .map(|resp| resp.with_importance(feature_importance()))
            .ok_or(InferenceError::InvalidOutput(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HousePredictionRequest {
        HousePredictionRequest {
            sqft: 1800.0,
            bedrooms: 4,
            bathrooms: 2.0,
            location: Location::Rural,
            year_built: 2004,
            condition: Condition::Fair,
        }
    }

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 14);
    }

    #[test]
    fn test_encode_numeric_features() {
        let row = encode_features(&sample(), 2024);
        let expected: [f32; 5] = [1800.0, 4.0, 2.0, 20.0, 2.0];
        assert_eq!(&row[..5], &expected[..]);
    }

    #[test]
    fn test_encode_one_hot() {
        let row = encode_features(&sample(), 2024);
        // rural is the third location, fair the third condition
        let location: [f32; 5] = [0.0, 0.0, 1.0, 0.0, 0.0];
        let condition: [f32; 4] = [0.0, 0.0, 1.0, 0.0];
        assert_eq!(&row[5..10], &location[..]);
        assert_eq!(&row[10..], &condition[..]);
    }

    #[test]
    fn test_encode_clamps_future_age() {
        let row = encode_features(&sample(), 2000);
        assert_eq!(row[3], 0.0);
    }

    #[test]
    fn test_feature_importance_covers_inputs() {
        let importance = feature_importance();
        assert_eq!(importance.len(), FEATURE_IMPORTANCE.len());
        assert_eq!(importance["sqft"], 0.43);
        assert_eq!(importance["location"], 0.27);
        assert_eq!(importance["bathrooms"], 0.15);

        let total: f64 = importance.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_response_carries_importance() {
        let resp = PredictionResponse::from_price(300_000.0, String::new())
            .unwrap()
            .with_importance(feature_importance());
        assert!(!resp.features_importance.is_empty());
        assert!(resp.features_importance.contains_key("house_age"));
    }

    #[test]
    fn test_load_missing_model_fails() {
        let err = OnnxPriceModel::load("does/not/exist.onnx").err().unwrap();
        assert!(matches!(err, InferenceError::ModelLoad { .. }));
        assert!(err.to_string().contains("does/not/exist.onnx"));
    }

    struct Fixed(f64);

    impl PricePredictor for Fixed {
        fn predict_price(&self, _: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError> {
            PredictionResponse::from_price(self.0, String::new()).ok_or(InferenceError::InvalidOutput(self.0))
        }
    }

    #[test]
    fn test_default_batch_preserves_length() {
        let out = Fixed(100.0).batch_predict(&[sample(), sample(), sample()]).unwrap();
        assert_eq!(out.len(), 3);
        assert!(Fixed(100.0).batch_predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_default_batch_aborts_on_failure() {
        let err = Fixed(-5.0).batch_predict(&[sample()]).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidOutput(p) if p == -5.0));
    }
}
