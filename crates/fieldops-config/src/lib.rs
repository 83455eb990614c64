//! Configuration module for the fieldops backend.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required configuration values are
//! properly set before any service starts, instead of reading settings ad
//! hoc at use sites.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the fieldops backend.
///
/// Contains all configuration sections: service identity, storage backend
/// selection, upload policy, and authentication secrets.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration specific to this service instance.
	pub service: ServiceConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Policy for photo uploads.
	#[serde(default)]
	pub uploads: UploadConfig,
	/// Secrets and lifetimes consumed by the authentication collaborator.
	pub auth: AuthConfig,
}

/// Configuration specific to this service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Unique identifier for this instance, used in logs.
	pub id: String,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Policy for photo uploads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
	/// Directory the file-storage collaborator writes uploads into.
	#[serde(default = "default_uploads_dir")]
	pub dir: String,
	/// Maximum accepted upload size in megabytes.
	#[serde(default = "default_max_upload_size_mb")]
	pub max_upload_size_mb: u64,
	/// MIME types accepted for photo uploads.
	#[serde(default = "default_allowed_mime_types")]
	pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
	fn default() -> Self {
		Self {
			dir: default_uploads_dir(),
			max_upload_size_mb: default_max_upload_size_mb(),
			allowed_mime_types: default_allowed_mime_types(),
		}
	}
}

impl UploadConfig {
	/// Returns true if the declared MIME type is in the allow-list.
	pub fn allows_mime_type(&self, content_type: &str) -> bool {
		self.allowed_mime_types
			.iter()
			.any(|allowed| allowed.eq_ignore_ascii_case(content_type))
	}

	/// Maximum accepted upload size in bytes.
	pub fn max_size_bytes(&self) -> u64 {
		self.max_upload_size_mb * 1024 * 1024
	}
}

fn default_uploads_dir() -> String {
	"uploads".to_string()
}

fn default_max_upload_size_mb() -> u64 {
	10
}

fn default_allowed_mime_types() -> Vec<String> {
	vec![
		"image/jpeg".to_string(),
		"image/png".to_string(),
		"image/webp".to_string(),
	]
}

/// Secrets and token lifetimes consumed by the authentication collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
	/// Secret used to sign access tokens.
	pub secret_key: String,
	/// Secret used to sign refresh tokens.
	pub refresh_secret_key: String,
	/// Access token lifetime in minutes.
	#[serde(default = "default_access_token_ttl_minutes")]
	pub access_token_ttl_minutes: u64,
	/// Refresh token lifetime in days.
	#[serde(default = "default_refresh_token_ttl_days")]
	pub refresh_token_ttl_days: u64,
}

fn default_access_token_ttl_minutes() -> u64 {
	15
}

fn default_refresh_token_ttl_days() -> u64 {
	14
}

impl Config {
	/// Loads configuration from a TOML file and validates it.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	/// Parses configuration from a TOML string and validates it.
	pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
		let config: Config = toml::from_str(contents)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates every recognized configuration field.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation(
				"service.id must not be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"storage.primary '{}' has no matching entry in storage.implementations",
				self.storage.primary
			)));
		}
		if self.uploads.max_upload_size_mb == 0 {
			return Err(ConfigError::Validation(
				"uploads.max_upload_size_mb must be greater than zero".into(),
			));
		}
		if self.uploads.allowed_mime_types.is_empty() {
			return Err(ConfigError::Validation(
				"uploads.allowed_mime_types must not be empty".into(),
			));
		}
		if self.auth.secret_key.trim().is_empty() || self.auth.refresh_secret_key.trim().is_empty()
		{
			return Err(ConfigError::Validation(
				"auth secrets must not be empty".into(),
			));
		}
		if self.auth.access_token_ttl_minutes == 0 || self.auth.refresh_token_ttl_days == 0 {
			return Err(ConfigError::Validation(
				"auth token lifetimes must be greater than zero".into(),
			));
		}
		Ok(())
	}
}
