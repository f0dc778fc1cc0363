use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::Connection;
use tempfile::TempDir;

use crate::adapters::db::{open_connection, run_migrations};

static TEST_DB_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn open_test_connection(test_name: &str) -> Connection {
    let dir = test_db_dir();
    let template = ensure_template_db(dir);
    let counter = TEST_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let test_db_path = dir.join(format!("{test_name}-{counter}.sqlite"));

    std::fs::copy(&template, &test_db_path).expect("template db should be copied");
    open_connection(test_db_path.to_string_lossy().as_ref()).expect("test db should open")
}

fn test_db_dir() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();

    DIR.get_or_init(|| tempfile::tempdir().expect("test db dir should be created"))
        .path()
}

fn ensure_template_db(dir: &Path) -> PathBuf {
    static TEMPLATE_PATH: OnceLock<PathBuf> = OnceLock::new();

    TEMPLATE_PATH
        .get_or_init(|| {
            let template_path = dir.join("template.sqlite");
            let mut connection = open_connection(template_path.to_string_lossy().as_ref())
                .expect("template db opens");
            run_migrations(&mut connection).expect("template migrations should succeed");

            template_path
        })
        .clone()
}
