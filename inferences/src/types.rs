use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Earliest construction year the model was trained on.
pub const MIN_YEAR_BUILT: i32 = 1800;

/// Upper bounds of the training data. Anything larger is out of the model's
/// domain.
pub const MAX_SQFT: f64 = 100_000.0;
pub const MAX_BEDROOMS: u32 = 50;
pub const MAX_BATHROOMS: f64 = 50.0;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[serde(alias = "Urban")]
    Urban,
    #[serde(alias = "Suburban")]
    Suburban,
    #[serde(alias = "Rural")]
    Rural,
    #[serde(alias = "Waterfront")]
    Waterfront,
    #[serde(alias = "Mountain")]
    Mountain,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::Urban,
        Location::Suburban,
        Location::Rural,
        Location::Waterfront,
        Location::Mountain,
    ];
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[serde(alias = "Excellent")]
    Excellent,
    #[serde(alias = "Good")]
    #[default]
    Good,
    #[serde(alias = "Fair")]
    Fair,
    #[serde(alias = "Poor")]
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];
}

/// Features describing one house, as posted by clients.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HousePredictionRequest {
    pub sqft: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub location: Location,
    pub year_built: i32,
    #[serde(default)]
    pub condition: Condition,
}

impl HousePredictionRequest {
    /// Range checks that serde cannot express. The error names the field.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.sqft > 0.0 && self.sqft <= MAX_SQFT) {
            return Err(format!(
                "sqft must be greater than 0 and at most {} (value: {})",
                MAX_SQFT, self.sqft
            ));
        }
        if !(1..=MAX_BEDROOMS).contains(&self.bedrooms) {
            return Err(format!(
                "bedrooms must be between 1 and {} (value: {})",
                MAX_BEDROOMS, self.bedrooms
            ));
        }
        if !(self.bathrooms > 0.0 && self.bathrooms <= MAX_BATHROOMS) {
            return Err(format!(
                "bathrooms must be greater than 0 and at most {} (value: {})",
                MAX_BATHROOMS, self.bathrooms
            ));
        }

        let current_year = chrono::Utc::now().year();
        if !(MIN_YEAR_BUILT..=current_year).contains(&self.year_built) {
            return Err(format!(
                "year_built must be between {} and {} (value: {})",
                MIN_YEAR_BUILT, current_year, self.year_built
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub confidence_interval: [f64; 2],
    pub features_importance: BTreeMap<String, f64>,
    pub prediction_time: String,
}

impl PredictionResponse {
    /// Wraps a raw model output. Returns `None` when the price is negative,
    /// not a number, or too large to round and bracket.
    pub fn from_price(raw_price: f64, prediction_time: String) -> Option<Self> {
        if raw_price < 0.0 {
            return None;
        }

        let predicted_price = round_cents(raw_price)?;
        let confidence_interval = [
            round_cents(predicted_price * 0.9)?,
            round_cents(predicted_price * 1.1)?,
        ];
        Some(PredictionResponse {
            predicted_price,
            confidence_interval,
            features_importance: BTreeMap::new(),
            prediction_time,
        })
    }

    pub fn with_importance(mut self, importance: BTreeMap<String, f64>) -> Self {
        self.features_importance = importance;
        self
    }
}

fn round_cents(value: f64) -> Option<f64> {
    let cents = (value * 100.0).round();
    cents.is_finite().then(|| cents / 100.0)
}
