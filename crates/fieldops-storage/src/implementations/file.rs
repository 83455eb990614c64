//! File-based storage backend for the fieldops services.
//!
//! Stores each record as one file under `<base>/<namespace>/<id>.json`.
//! Writes go through a temporary file followed by a rename so a crash
//! mid-write never leaves a half-written record behind.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use fieldops_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};
use std::path::{Path, PathBuf};
use std::process;
use tokio::fs;

/// File-based storage implementation.
///
/// This implementation stores data as JSON files on the filesystem,
/// providing simple persistence without requiring external dependencies.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Splits a storage key into its namespace and id parts.
	fn split_key(key: &str) -> Result<(&str, &str), StorageError> {
		key.split_once(':')
			.ok_or_else(|| StorageError::Backend(format!("Malformed storage key: {}", key)))
	}

	/// Converts a storage key to its filesystem path.
	fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
		let (namespace, id) = Self::split_key(key)?;
		if id.contains(['/', '\\', ':']) || id == "." || id == ".." {
			return Err(StorageError::Backend(format!(
				"Id is not filesystem-safe: {}",
				id
			)));
		}
		Ok(self.base_path.join(namespace).join(format!("{}.json", id)))
	}

	fn namespace_dir(&self, namespace: &str) -> PathBuf {
		self.base_path.join(namespace)
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key)?;

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key)?;
		let dir = path
			.parent()
			.ok_or_else(|| StorageError::Backend("Key has no parent directory".into()))?;
		fs::create_dir_all(dir)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		// Write to a temp file in the same directory, then rename into place
		let nanos = std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map_err(|e| StorageError::Backend(e.to_string()))?
			.as_nanos();
		let tmp = dir.join(format!(".tmp_{}_{}", process::id(), nanos));
		fs::write(&tmp, &value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&tmp, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key)?;
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.file_path(key)?;
		Ok(fs::try_exists(&path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?)
	}

	async fn list_ids(&self, namespace: &str) -> Result<Vec<String>, StorageError> {
		let dir = self.namespace_dir(namespace);
		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			// A namespace that was never written to is an empty collection
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut ids = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() == Some(std::ffi::OsStr::new("json")) {
				if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
					ids.push(stem.to_string());
				}
			}
		}
		ids.sort();
		Ok(ids)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(vec![Field::new("storage_path", FieldType::String)], vec![]);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for stored records (required)
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| StorageError::Configuration("storage_path must be a string".into()))?;

	Ok(Box::new(FileStorage::new(Path::new(storage_path).into())))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_roundtrip_and_listing() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().into());

		storage
			.set_bytes("orders:one", b"first".to_vec())
			.await
			.unwrap();
		storage
			.set_bytes("orders:two", b"second".to_vec())
			.await
			.unwrap();
		storage
			.set_bytes("payouts:one", b"payout".to_vec())
			.await
			.unwrap();

		assert_eq!(storage.get_bytes("orders:one").await.unwrap(), b"first");
		assert!(storage.exists("orders:two").await.unwrap());
		assert_eq!(
			storage.list_ids("orders").await.unwrap(),
			vec!["one".to_string(), "two".to_string()]
		);

		storage.delete("orders:one").await.unwrap();
		assert!(!storage.exists("orders:one").await.unwrap());
		assert!(matches!(
			storage.get_bytes("orders:one").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_empty_namespace_lists_nothing() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().into());

		assert!(storage.list_ids("photos").await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_rejects_unsafe_id() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path().into());

		let result = storage.set_bytes("orders:../escape", b"x".to_vec()).await;
		assert!(matches!(result, Err(StorageError::Backend(_))));
	}

	#[test]
	fn test_factory_requires_storage_path() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
