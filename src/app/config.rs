use std::net::SocketAddr;
use std::path::PathBuf;

use crate::app::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub http_bind: SocketAddr,
    pub cors_allowed_origin: String,
    pub migrations_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        if let Err(error) = dotenvy::dotenv()
            && !error.not_found()
        {
            return Err(AppError::config(format!("failed to load .env file: {error}")));
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_bind = non_blank(&lookup, "HTTP_BIND")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse::<SocketAddr>()
            .map_err(|_| AppError::config("HTTP_BIND must be a socket address like 0.0.0.0:8080"))?;

        let cors_allowed_origin = non_blank(&lookup, "CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|| "http://localhost:5173".to_string());
        if !(cors_allowed_origin.starts_with("http://")
            || cors_allowed_origin.starts_with("https://"))
        {
            return Err(AppError::config(
                "CORS_ALLOWED_ORIGIN must start with http:// or https://",
            ));
        }

        Ok(Self {
            db_path: non_blank(&lookup, "DB_PATH")
                .unwrap_or_else(|| "./data/energy_records.db".to_string()),
            http_bind,
            cors_allowed_origin,
            migrations_dir: non_blank(&lookup, "MIGRATIONS_DIR").map(PathBuf::from),
        })
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
