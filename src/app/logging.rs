use tracing_subscriber::{EnvFilter, fmt};

use crate::app::AppError;

const DEFAULT_FILTER: &str = "info";

pub fn init() -> Result<(), AppError> {
    fmt()
        .with_env_filter(filter_from(std::env::var("RUST_LOG").ok()))
        .with_target(true)
        .try_init()
        .map_err(AppError::logging_init)
}

fn filter_from(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
