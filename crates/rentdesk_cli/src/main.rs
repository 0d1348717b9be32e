//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a file-backed registry against a data directory and report its
//!   record counts, so core wiring can be checked without a UI.
//! - Keep output deterministic for quick local sanity checks.

use rentdesk_core::{RegistryConfig, RepositoryRegistry};
use std::path::PathBuf;

fn main() {
    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let data_path = PathBuf::from(&data_dir);
    let data_path = if data_path.is_absolute() {
        data_path
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(data_path),
            Err(_) => data_path,
        }
    };

    let log_dir = data_path.join("logs");
    if let Err(err) =
        rentdesk_core::init_logging(rentdesk_core::default_log_level(), &log_dir.to_string_lossy())
    {
        eprintln!("logging disabled: {err}");
    }

    let config = RegistryConfig::json_file(&data_path);
    match RepositoryRegistry::open(&config) {
        Ok(mut registry) => {
            println!("rentdesk_core version={}", rentdesk_core::core_version());
            println!("data_dir={}", data_path.display());
            println!(
                "customers={} articles={} reservations={}",
                registry.customers().len(),
                registry.articles().len(),
                registry.reservations().len()
            );
            registry.stop();
        }
        Err(err) => {
            eprintln!("failed to open registry: {err}");
            std::process::exit(1);
        }
    }
}
