use std::path::Path;
use std::sync::{Arc, Mutex};

use actix_web::{App, HttpServer, web};
use rusqlite::Connection;

use crate::adapters::api::{ApiState, configure_routes, cors_policy};
use crate::adapters::db;
use crate::app::config::AppConfig;
use crate::app::error::AppError;
use crate::app::services::SqliteRecordStore;
use crate::domain::clock::SystemClock;

fn prepare_database(config: &AppConfig) -> Result<Connection, AppError> {
    if let Some(parent) = Path::new(&config.db_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(AppError::database_init)?;
    }

    let mut connection = db::open_connection(&config.db_path).map_err(AppError::database_init)?;
    db::run_migrations(&mut connection).map_err(AppError::database_init)?;

    if let Some(dir) = &config.migrations_dir {
        let applied =
            db::apply_migrations_dir(&mut connection, dir).map_err(AppError::database_init)?;
        tracing::info!(
            migrations_dir = %dir.display(),
            applied = applied.len(),
            "directory migrations applied"
        );
    }

    let schema_version = db::schema_version(&connection).map_err(AppError::database_init)?;
    tracing::info!(db_path = %config.db_path, schema_version, "database ready");

    Ok(connection)
}

pub fn run(config: AppConfig) -> Result<(), AppError> {
    let connection = prepare_database(&config)?;

    let api_state = ApiState::new(SqliteRecordStore::new(
        Arc::new(Mutex::new(connection)),
        SystemClock,
    ));
    let allowed_origin = config.cors_allowed_origin.clone();

    tracing::info!(bind = %config.http_bind, "http server starting");

    actix_web::rt::System::new()
        .block_on(async move {
            HttpServer::new(move || {
                App::new()
                    .wrap(cors_policy(&allowed_origin))
                    .app_data(web::Data::new(api_state.clone()))
                    .configure(configure_routes)
            })
            .bind(config.http_bind)?
            .run()
            .await
        })
        .map_err(AppError::runtime)
}
