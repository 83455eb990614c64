//! Workspace user directory.
//!
//! User records are read inputs for order validation and the ownership
//! gates. Creation runs through administrative tooling; authentication of
//! the created users is the collaborator layer's concern.

use crate::error::CoreError;
use fieldops_storage::StorageService;
use fieldops_types::{Role, StorageKey, User};
use std::sync::Arc;
use uuid::Uuid;

/// Service managing workspace user records.
pub struct DirectoryService {
	storage: Arc<StorageService>,
}

impl DirectoryService {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Adds a user record to a workspace.
	pub async fn add_user(
		&self,
		workspace_id: &str,
		role: Role,
		full_name: &str,
	) -> Result<User, CoreError> {
		let user = User {
			id: Uuid::new_v4().to_string(),
			workspace_id: workspace_id.to_string(),
			role,
			full_name: full_name.to_string(),
		};
		self.storage
			.store(StorageKey::Users.as_str(), &user.id, &user)
			.await?;
		Ok(user)
	}

	/// Gets a user by id.
	pub async fn get_user(&self, user_id: &str) -> Result<User, CoreError> {
		self.storage
			.retrieve(StorageKey::Users.as_str(), user_id)
			.await
			.map_err(|e| CoreError::from_lookup(e, "user"))
	}

	/// Lists the users of a workspace.
	pub async fn list_users(&self, workspace_id: &str) -> Result<Vec<User>, CoreError> {
		let users: Vec<User> = self.storage.retrieve_all(StorageKey::Users.as_str()).await?;
		Ok(users
			.into_iter()
			.filter(|u| u.workspace_id == workspace_id)
			.collect())
	}
}
