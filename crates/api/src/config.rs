use crate::auth::jwt::JwtConfig;

/// Icon locator used for media whose bundle type has no thumbnail of its own.
pub const DEFAULT_THUMBNAIL: &str = "public://media-icons/generic.png";

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub media: MediaConfig,
}

/// Media pipeline settings.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Thumbnail locator of the `generic` bundle type.
    pub default_thumbnail: String,
}

impl MediaConfig {
    pub fn from_env() -> Self {
        let default_thumbnail = std::env::var("MEDIA_DEFAULT_THUMBNAIL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string());
        Self { default_thumbnail }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                            |
    /// |---------------------------|------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                          |
    /// | `PORT`                    | `3000`                             |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`            |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                               |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                               |
    /// | `MEDIA_DEFAULT_THUMBNAIL` | `public://media-icons/generic.png` |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            media: MediaConfig::from_env(),
        }
    }
}
