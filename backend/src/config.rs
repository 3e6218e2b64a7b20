use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

use crate::api::DEFAULT_JSON_LIMIT;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/house_price.onnx";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_path: PathBuf,
    pub json_limit: usize,
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `WORKERS`, `MODEL_PATH` and `JSON_LIMIT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        ServerConfig {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            workers: parse_workers(&lookup),
            model_path: lookup("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            json_limit: parse_or(&lookup, "JSON_LIMIT", DEFAULT_JSON_LIMIT),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

/// `WORKERS=0` would make actix panic at startup, so it counts as invalid.
fn parse_workers<F>(lookup: &F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, "WORKERS", num_cpus::get()) {
        0 => {
            warn!("Ignoring invalid WORKERS=\"0\"");
            num_cpus::get()
        }
        n => n,
    }
}
