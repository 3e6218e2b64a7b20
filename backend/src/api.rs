use std::time::Instant;

use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::info;
use price_inference::HousePredictionRequest;

use crate::cors::CorsPolicy;
use crate::error::ApiError;
use crate::inference::InferenceGateway;
use crate::models::HealthStatus;

pub const API_TITLE: &str = "House Price Prediction API";

/// Default cap on request bodies, large enough for big batches.
pub const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024;

/// Identifies one API generation, e.g. `("v1", " v1")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub label: String,
    pub title_suffix: String,
}

impl VersionDescriptor {
    pub fn new(label: impl Into<String>, title_suffix: impl Into<String>) -> Self {
        VersionDescriptor {
            label: label.into(),
            title_suffix: title_suffix.into(),
        }
    }

    pub fn title(&self) -> String {
        format!("{}{}", API_TITLE, self.title_suffix)
    }
}

/// A self-contained sub-application: `/health`, `/predict` and
/// `/batch-predict` behind its own CORS policy. Building one has no side
/// effects; routes exist only once it is mounted.
#[derive(Debug, Clone)]
pub struct VersionedApi {
    descriptor: VersionDescriptor,
    cors: CorsPolicy,
    json_limit: usize,
}

impl VersionedApi {
    pub const ROUTES: [(&'static str, &'static str); 3] = [
        ("GET", "/health"),
        ("POST", "/predict"),
        ("POST", "/batch-predict"),
    ];

    pub fn build(descriptor: VersionDescriptor, cors: CorsPolicy) -> Self {
        VersionedApi {
            descriptor,
            cors,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }

    pub fn with_json_limit(mut self, json_limit: usize) -> Self {
        self.json_limit = json_limit;
        self
    }

    pub fn descriptor(&self) -> &VersionDescriptor {
        &self.descriptor
    }

    pub fn cors(&self) -> &CorsPolicy {
        &self.cors
    }

    /// Registers this sub-application under `prefix`.
    pub fn mount(&self, prefix: &str, gateway: &InferenceGateway, cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope(prefix)
                .wrap(self.cors.middleware())
                .app_data(web::Data::new(gateway.clone()))
                .app_data(web::Data::new(self.descriptor.clone()))
                .app_data(self.json_config())
                .service(web::resource("/health").route(web::get().to(health_check)))
                .service(web::resource("/predict").route(web::post().to(predict)))
                .service(web::resource("/batch-predict").route(web::post().to(batch_predict))),
        );
    }

    fn json_config(&self) -> web::JsonConfig {
        web::JsonConfig::default()
            .limit(self.json_limit)
            .error_handler(json_error)
    }
}

/// Oversized bodies and a missing JSON content type keep actix's own status
/// (413, 415); anything else is a schema failure.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Overflow { .. }
        | JsonPayloadError::OverflowKnownLength { .. }
        | JsonPayloadError::ContentType => err.into(),
        other => ApiError::Validation(other.to_string()).into(),
    }
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::HEALTHY)
}

async fn predict(
    gateway: web::Data<InferenceGateway>,
    version: web::Data<VersionDescriptor>,
    req: web::Json<HousePredictionRequest>,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let request = req.into_inner();
    request.validate().map_err(ApiError::Validation)?;

    let gateway = gateway.clone();
    let response = web::block(move || gateway.predict_one(&request)).await??;

    info!(
        "[{}] predicted {:.2} in {} ms",
        version.label,
        response.predicted_price,
        start_time.elapsed().as_millis()
    );
    Ok(HttpResponse::Ok().json(response))
}

async fn batch_predict(
    gateway: web::Data<InferenceGateway>,
    version: web::Data<VersionDescriptor>,
    req: web::Json<Vec<HousePredictionRequest>>,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let requests = req.into_inner();
    info!("[{}] batch of {} houses", version.label, requests.len());

    for (i, request) in requests.iter().enumerate() {
        request
            .validate()
            .map_err(|e| ApiError::Validation(format!("item {}: {}", i, e)))?;
    }

    let gateway = gateway.clone();
    let responses = web::block(move || gateway.predict_many(&requests)).await??;

    info!(
        "[{}] batch done: {} predictions in {} ms",
        version.label,
        responses.len(),
        start_time.elapsed().as_millis()
    );
    Ok(HttpResponse::Ok().json(responses))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_uses_suffix() {
        assert_eq!(
            VersionDescriptor::new("v1", " v1").title(),
            "House Price Prediction API v1"
        );
        assert_eq!(
            VersionDescriptor::new("latest", "").title(),
            "House Price Prediction API"
        );
    }

    #[test]
    fn test_build_is_repeatable() {
        let a = VersionedApi::build(VersionDescriptor::new("v1", " v1"), CorsPolicy::open());
        let b = VersionedApi::build(VersionDescriptor::new("v1", " v1"), CorsPolicy::open());
        assert_eq!(a.descriptor(), b.descriptor());
        assert_eq!(a.cors(), b.cors());
        assert_eq!(a.json_limit, DEFAULT_JSON_LIMIT);
    }

    #[test]
    fn test_exactly_three_routes() {
        assert_eq!(VersionedApi::ROUTES.len(), 3);
    }
}
