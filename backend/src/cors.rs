use actix_cors::Cors;

/// Cross-origin settings handed to each sub-application when it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    pub allow_any_origin: bool,
    pub allow_credentials: bool,
    pub allow_any_method: bool,
    pub allow_any_header: bool,
    pub max_age: Option<usize>,
}

impl CorsPolicy {
    /// Any origin, method and header, with credentials. With credentials on,
    /// the request's `Origin` is echoed back instead of `*`.
    pub fn open() -> Self {
        CorsPolicy {
            allow_any_origin: true,
            allow_credentials: true,
            allow_any_method: true,
            allow_any_header: true,
            max_age: None,
        }
    }

    /// Builds the middleware. `Cors` is not `Send`, so this runs once per
    /// worker inside the app factory.
    pub fn middleware(&self) -> Cors {
        let mut cors = Cors::default();

        if self.allow_any_origin {
            cors = cors.allow_any_origin();
        }
        if self.allow_any_method {
            cors = cors.allow_any_method();
        }
        if self.allow_any_header {
            cors = cors.allow_any_header();
        }
        if self.allow_credentials {
            cors = cors.supports_credentials();
        }

        cors.max_age(self.max_age)
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::open()
    }
}
