//! Application configuration loaded from environment variables.

use std::env;

use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    /// Allowed browser origin for CORS; also a fallback for email links.
    pub client_origin: Option<String>,
    /// Preferred public URL used in verification links.
    pub public_app_url: Option<String>,
    pub upload_dir: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        // CLIENT_ORIGIN may hold a comma-separated list; the first entry wins.
        let client_origin = env::var("CLIENT_ORIGIN").ok().and_then(|value| {
            value
                .split(',')
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            client_origin,
            public_app_url: env::var("PUBLIC_APP_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
        }
    }

    /// Resolve the origin that verification links should point at: the
    /// configured public URL, else the configured client origin, else the
    /// request's own Origin header, else a localhost dev fallback.
    pub fn verification_origin(&self, request_origin: Option<&str>) -> String {
        self.public_app_url
            .as_deref()
            .or(self.client_origin.as_deref())
            .or(request_origin.map(str::trim).filter(|o| !o.is_empty()))
            .unwrap_or("http://localhost:5173")
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            database: None,
            client_origin: None,
            public_app_url: None,
            upload_dir: "./uploads".into(),
        }
    }

    #[test]
    fn verification_origin_prefers_configured_urls() {
        let mut config = bare_config();
        assert_eq!(
            config.verification_origin(Some("https://req.example")),
            "https://req.example"
        );

        config.client_origin = Some("https://client.example/".into());
        assert_eq!(
            config.verification_origin(Some("https://req.example")),
            "https://client.example"
        );

        config.public_app_url = Some("https://public.example".into());
        assert_eq!(config.verification_origin(None), "https://public.example");
    }

    #[test]
    fn verification_origin_falls_back_to_localhost() {
        assert_eq!(
            bare_config().verification_origin(None),
            "http://localhost:5173"
        );
    }
}
