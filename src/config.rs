use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use shuttle_runtime::SecretStore;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Front-end deployments allowed when `CORS_ORIGINS` is not set.
const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "https://startai.vercel.app",
    "https://startai-startai-ais-projects.vercel.app",
    "http://localhost:4200",
];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cors_origins: Vec<HeaderValue>,
}

impl AppConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Self {
        Self::from_lookup(|key| secrets.get(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let configured = lookup("CORS_ORIGINS").filter(|raw| !raw.trim().is_empty());
        let raw: Vec<String> = match configured {
            Some(raw) => raw.split(',').map(|o| o.trim().to_string()).collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let cors_origins = raw
            .iter()
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        Self { cors_origins }
    }

    pub fn cors_layer(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.cors_origins.clone()))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([CONTENT_TYPE])
    }
}
