use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use anyhow::Context;
use log::info;
use price_api::{CompositionRoot, CorsPolicy, InferenceGateway, ServerConfig, VersionedApi};
use price_inference::OnnxPriceModel;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = ServerConfig::from_env();
    info!("Starting house price prediction API");

    let model = OnnxPriceModel::load(&config.model_path)
        .with_context(|| format!("cannot start without a model at {}", config.model_path.display()))?;
    let gateway = InferenceGateway::new(Arc::new(model));

    let dispatcher = CompositionRoot::new(gateway, CorsPolicy::open())
        .with_json_limit(config.json_limit)
        .compose();

    let bind_address = config.bind_address();
    info!("Listening on http://{} with {} workers", bind_address, config.workers);
    info!("   GET  /");
    for mount in dispatcher.mounts() {
        info!("{} at {}", mount.api.descriptor().title(), mount.prefix);
        for (method, path) in VersionedApi::ROUTES {
            info!("   {:<4} {}{}", method, mount.prefix, path);
        }
    }

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| dispatcher.configure(cfg))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
