//! HTTP front end for the house price model: two API versions mounted side by
//! side over one shared inference gateway.

pub mod api;
pub mod compose;
pub mod config;
pub mod cors;
pub mod error;
pub mod inference;
pub mod models;

pub use api::{VersionDescriptor, VersionedApi};
pub use compose::{compose, CompositionRoot, Dispatcher, ROOT_MESSAGE};
pub use config::ServerConfig;
pub use cors::CorsPolicy;
pub use error::ApiError;
pub use inference::InferenceGateway;
