//! Administrative entry point for the fieldops backend.
//!
//! Loads the configuration, wires the configured storage backend into the
//! service bundle, and runs the payout backfill over every stored order.
//! The HTTP surface runs as a separate collaborator; this binary covers
//! the operational tooling.

use clap::Parser;
use fieldops_config::Config;
use fieldops_core::OpsService;
use fieldops_storage::{get_all_implementations, StorageFactory, StorageService};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments for the fieldops admin binary.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Compute payout amounts without persisting anything
	#[arg(long)]
	dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let ops = build_service(config)?;

	let report = ops.backfill_payouts(args.dry_run).await?;
	tracing::info!(
		processed = report.processed,
		dry_run = args.dry_run,
		"payout backfill complete"
	);

	Ok(())
}

/// Builds the service bundle on top of the configured storage backend.
fn build_service(config: Config) -> Result<OpsService, Box<dyn std::error::Error>> {
	let factories: HashMap<String, StorageFactory> = get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();

	let primary = &config.storage.primary;
	let factory = factories
		.get(primary)
		.ok_or_else(|| format!("unknown storage backend '{}'", primary))?;
	let backend_config = config
		.storage
		.implementations
		.get(primary)
		.ok_or_else(|| format!("missing storage.implementations entry for '{}'", primary))?;
	let backend = factory(backend_config)?;

	let storage = Arc::new(StorageService::new(backend));
	Ok(OpsService::new(config, storage))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn write_config(dir: &tempfile::TempDir, storage_section: &str) -> PathBuf {
		let path = dir.path().join("config.toml");
		let contents = format!(
			r#"
				[service]
				id = "fieldops-test"

				[storage]
				primary = "{storage_section}"

				[storage.implementations.{storage_section}]
				{extra}

				[auth]
				secret_key = "access-secret"
				refresh_secret_key = "refresh-secret"
			"#,
			storage_section = storage_section,
			extra = if storage_section == "file" {
				format!("storage_path = {:?}", dir.path().join("data"))
			} else {
				String::new()
			},
		);
		let mut file = std::fs::File::create(&path).unwrap();
		file.write_all(contents.as_bytes()).unwrap();
		path
	}

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
			dry_run: false,
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
		assert!(!args.dry_run);
	}

	#[test]
	fn test_build_service_with_memory_backend() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(&dir, "memory");

		let config = Config::from_file(path).unwrap();
		let ops = build_service(config).unwrap();
		assert_eq!(ops.config().service.id, "fieldops-test");
	}

	#[test]
	fn test_build_service_with_file_backend() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(&dir, "file");

		let config = Config::from_file(path).unwrap();
		assert!(build_service(config).is_ok());
	}

	#[test]
	fn test_build_service_rejects_unknown_backend() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(&dir, "memory");

		let mut config = Config::from_file(path).unwrap();
		config.storage.primary = "redis".to_string();
		assert!(build_service(config).is_err());
	}

	#[tokio::test]
	async fn test_backfill_on_empty_store() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_config(&dir, "memory");

		let config = Config::from_file(path).unwrap();
		let ops = build_service(config).unwrap();
		let report = ops.backfill_payouts(false).await.unwrap();
		assert_eq!(report.processed, 0);
	}
}
