use std::path::Path;

use chrono::Utc;
use home_energy_api::adapters::db::{insert_record, open_connection, run_migrations, schema_version};
use home_energy_api::domain::models::EnergyRecordInput;

const SAMPLE_RECORDS: &[(f64, f64, &str)] = &[
    (1.2, 0.5, "Kettle"),
    (0.06, 5.0, "Laptop"),
    (0.9, 8.0, "Refrigerator"),
    (2.1, 1.5, "Washing machine"),
];

fn main() {
    if let Err(error) = run() {
        eprintln!("failed to create test db: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut path = if cfg!(windows) {
        ".\\data\\energy_records_test.db".to_string()
    } else {
        "./data/energy_records_test.db".to_string()
    };
    let mut force = false;
    let mut seed = false;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--path" => {
                let Some(value) = args.get(index + 1) else {
                    return Err("--path requires a value".to_string());
                };
                path = value.clone();
                index += 2;
            }
            "--force" => {
                force = true;
                index += 1;
            }
            "--seed" => {
                seed = true;
                index += 1;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                return Err(format!("unknown argument: {other}"));
            }
        }
    }

    let path_ref = Path::new(&path);
    if let Some(parent) = path_ref.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|error| format!("failed to create parent directory: {error}"))?;
    }

    if force && path_ref.exists() {
        std::fs::remove_file(path_ref)
            .map_err(|error| format!("failed to remove existing db file: {error}"))?;
    }

    let mut connection = open_connection(&path).map_err(|error| error.to_string())?;
    run_migrations(&mut connection).map_err(|error| error.to_string())?;
    let version = schema_version(&connection).map_err(|error| error.to_string())?;

    if seed {
        for (usage, duration, device) in SAMPLE_RECORDS {
            let input = EnergyRecordInput::new(*usage, *duration, *device);
            let record =
                insert_record(&connection, &input, Utc::now()).map_err(|error| error.to_string())?;
            println!("seeded record {} ({})", record.id, record.device);
        }
    }

    println!("created/updated test db at: {path}");
    println!("schema version: {version}");
    Ok(())
}

fn print_help() {
    println!("create_test_db");
    println!();
    println!("Usage:");
    println!("  cargo run --bin create_test_db -- [--path <file>] [--force] [--seed]");
    println!();
    println!("Options:");
    println!("  --path <file>   target sqlite file (default: ./data/energy_records_test.db)");
    println!("  --force         delete existing file before creating");
    println!("  --seed          insert a handful of sample energy records");
}
