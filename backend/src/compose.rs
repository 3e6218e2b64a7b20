//! Top-level dispatcher: every API version mounted under its own prefix,
//! plus a discovery route at `/`.
//!
//! Composition is one-shot. [`CompositionRoot`] is consumed by
//! [`CompositionRoot::compose`], and the resulting [`Dispatcher`] has no way
//! to add, remove or replace a version. Shipping a new version means changing
//! [`VERSIONS`] and restarting.

use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use crate::api::{VersionDescriptor, VersionedApi, DEFAULT_JSON_LIMIT};
use crate::cors::CorsPolicy;
use crate::inference::InferenceGateway;
use crate::models::RootMessage;

/// `(label, title suffix)` for each mounted version. The label doubles as the
/// path prefix.
pub const VERSIONS: [(&str, &str); 2] = [("v1", " v1"), ("latest", " Latest")];

pub const ROOT_MESSAGE: &str = "Use /v1 or /latest endpoints";

#[derive(Debug, Clone)]
pub struct Mount {
    pub prefix: String,
    pub api: VersionedApi,
}

pub struct CompositionRoot {
    gateway: InferenceGateway,
    cors: CorsPolicy,
    json_limit: usize,
}

impl CompositionRoot {
    pub fn new(gateway: InferenceGateway, cors: CorsPolicy) -> Self {
        CompositionRoot {
            gateway,
            cors,
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }

    pub fn with_json_limit(mut self, json_limit: usize) -> Self {
        self.json_limit = json_limit;
        self
    }

    pub fn compose(self) -> Dispatcher {
        let mounts: Vec<Mount> = VERSIONS
            .iter()
            .map(|(label, suffix)| Mount {
                prefix: format!("/{}", label),
                api: VersionedApi::build(VersionDescriptor::new(*label, *suffix), self.cors.clone())
                    .with_json_limit(self.json_limit),
            })
            .collect();

        Dispatcher {
            mounts: mounts.into(),
            gateway: self.gateway,
            cors: self.cors,
        }
    }
}

/// Composes the standard versions with the open CORS policy.
pub fn compose(gateway: InferenceGateway) -> Dispatcher {
    CompositionRoot::new(gateway, CorsPolicy::open()).compose()
}

/// The composed mount table. Cheap to clone; each actix worker calls
/// [`Dispatcher::configure`] on its own copy.
#[derive(Clone)]
pub struct Dispatcher {
    mounts: Arc<[Mount]>,
    gateway: InferenceGateway,
    cors: CorsPolicy,
}

impl Dispatcher {
    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for mount in self.mounts.iter() {
            mount.api.mount(&mount.prefix, &self.gateway, cfg);
        }
        cfg.service(
            web::resource("/")
                .wrap(self.cors.middleware())
                .route(web::get().to(root)),
        );
    }
}

async fn root() -> impl Responder {
    HttpResponse::Ok().json(RootMessage { message: ROOT_MESSAGE })
}
