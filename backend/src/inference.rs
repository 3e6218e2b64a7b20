use std::sync::Arc;

use price_inference::{HousePredictionRequest, InferenceError, PredictionResponse, PricePredictor};

/// The only path from the HTTP layer to the model. Both API versions share one
/// gateway, so identical input yields identical output under any prefix.
#[derive(Clone)]
pub struct InferenceGateway {
    engine: Arc<dyn PricePredictor>,
}

impl InferenceGateway {
    pub fn new(engine: Arc<dyn PricePredictor>) -> Self {
        Self { engine }
    }

    /// Callers must validate `request` first.
    pub fn predict_one(&self, request: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError> {
        let response = self.engine.predict_price(request)?;
        check_price(&response)?;
        Ok(response)
    }

    /// All-or-nothing: one failing item fails the batch. Output order matches
    /// input order.
    pub fn predict_many(
        &self,
        requests: &[HousePredictionRequest],
    ) -> Result<Vec<PredictionResponse>, InferenceError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let responses = self.engine.batch_predict(requests)?;
        if responses.len() != requests.len() {
            return Err(InferenceError::BatchLength {
                expected: requests.len(),
                actual: responses.len(),
            });
        }
        for response in &responses {
            check_price(response)?;
        }
        Ok(responses)
    }
}

fn check_price(response: &PredictionResponse) -> Result<(), InferenceError> {
    let price = response.predicted_price;
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(InferenceError::InvalidOutput(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use price_inference::{Condition, Location};
    use std::collections::BTreeMap;

    /// Prices a house at 200 per square foot.
    struct PerSqft;

    impl PricePredictor for PerSqft {
        fn predict_price(&self, r: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError> {
            PredictionResponse::from_price(r.sqft * 200.0, "fixed".to_string())
                .ok_or(InferenceError::InvalidOutput(r.sqft))
        }
    }

    struct Truncating;

    impl PricePredictor for Truncating {
        fn predict_price(&self, r: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError> {
            PerSqft.predict_price(r)
        }

        fn batch_predict(
            &self,
            requests: &[HousePredictionRequest],
        ) -> Result<Vec<PredictionResponse>, InferenceError> {
            let mut all = PerSqft.batch_predict(requests)?;
            all.pop();
            Ok(all)
        }
    }

    struct Negative;

    impl PricePredictor for Negative {
        fn predict_price(&self, _: &HousePredictionRequest) -> Result<PredictionResponse, InferenceError> {
            Ok(PredictionResponse {
                predicted_price: -1.0,
                confidence_interval: [0.0, 0.0],
                features_importance: BTreeMap::new(),
                prediction_time: String::new(),
            })
        }
    }

    fn house(sqft: f64) -> HousePredictionRequest {
        HousePredictionRequest {
            sqft,
            bedrooms: 2,
            bathrooms: 1.0,
            location: Location::Urban,
            year_built: 1985,
            condition: Condition::Good,
        }
    }

    #[test]
    fn test_predict_one_non_negative() {
        let gateway = InferenceGateway::new(Arc::new(PerSqft));
        let resp = gateway.predict_one(&house(1000.0)).unwrap();
        assert_eq!(resp.predicted_price, 200_000.0);
    }

    #[test]
    fn test_predict_many_matches_predict_one_in_order() {
        let gateway = InferenceGateway::new(Arc::new(PerSqft));
        let inputs = vec![house(900.0), house(1500.0), house(1200.0)];

        let batch = gateway.predict_many(&inputs).unwrap();
        assert_eq!(batch.len(), inputs.len());
        for (input, output) in inputs.iter().zip(&batch) {
            assert_eq!(*output, gateway.predict_one(input).unwrap());
        }
    }

    #[test]
    fn test_predict_many_empty() {
        let gateway = InferenceGateway::new(Arc::new(PerSqft));
        assert!(gateway.predict_many(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_batch_length_mismatch_is_error() {
        let gateway = InferenceGateway::new(Arc::new(Truncating));
        let err = gateway.predict_many(&[house(1.0), house(2.0)]).unwrap_err();
        assert!(matches!(err, InferenceError::BatchLength { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_negative_price_rejected() {
        let gateway = InferenceGateway::new(Arc::new(Negative));
        assert!(matches!(
            gateway.predict_one(&house(1.0)),
            Err(InferenceError::InvalidOutput(_))
        ));
        assert!(gateway.predict_many(&[house(1.0)]).is_err());
    }
}
