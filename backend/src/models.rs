use serde::Serialize;

/// Body of `GET /health`. `model_loaded` is always `true`: the endpoint is a
/// liveness signal and does not probe the model.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_loaded: bool,
}

impl HealthStatus {
    pub const HEALTHY: HealthStatus = HealthStatus {
        status: "healthy",
        model_loaded: true,
    };
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RootMessage {
    pub message: &'static str,
}

/// Envelope returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }
}
