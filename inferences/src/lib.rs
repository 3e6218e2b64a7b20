//! House price inference: request schema, feature encoding and the ONNX
//! model behind the prediction API.

pub mod inference;
pub mod types;

pub use inference::{encode_features, feature_importance, InferenceError, OnnxPriceModel, PricePredictor, FEATURE_COUNT};
pub use types::{Condition, HousePredictionRequest, Location, PredictionResponse};
