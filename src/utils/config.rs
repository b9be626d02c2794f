use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
    pub cors_origin: String,
    /// Log phase transitions verbosely.
    pub verbose_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 8080,
            cors_origin: "http://localhost:3000".to_string(),
            verbose_logging: cfg!(debug_assertions),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env::var("LUPINE_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let cors_origin = env::var("LUPINE_CORS_ORIGIN").unwrap_or(defaults.cors_origin);
        let verbose_logging = env::var("LUPINE_VERBOSE_LOGGING")
            .map(|v| v == "true")
            .unwrap_or(defaults.verbose_logging);

        Self {
            host: defaults.host,
            port,
            cors_origin,
            verbose_logging,
        }
    }
}
