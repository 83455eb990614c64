//! Actor identity types.
//!
//! Every core operation runs on behalf of an authenticated actor resolved
//! by the surrounding authentication layer. The core only consumes the
//! resolved identity: user id, role, and the workspace (tenant) the actor
//! belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user inside a workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Creates orders, reviews photos, manages the workspace catalog.
	Operator,
	/// Performs assigned field work and uploads photo evidence.
	Promoter,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Role::Operator => write!(f, "operator"),
			Role::Promoter => write!(f, "promoter"),
		}
	}
}

/// Resolved identity of the actor performing an operation.
///
/// Produced by the authentication collaborator before any core operation
/// runs; the core treats it as trusted input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
	/// Id of the acting user.
	pub user_id: String,
	/// Role of the acting user.
	pub role: Role,
	/// Workspace the actor is scoped to.
	pub workspace_id: String,
}

/// A user record stored in the workspace directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: String,
	/// Workspace this user belongs to.
	pub workspace_id: String,
	/// Role of the user within the workspace.
	pub role: Role,
	/// Display name.
	pub full_name: String,
}

impl User {
	/// Returns the identity this user acts under.
	pub fn identity(&self) -> Identity {
		Identity {
			user_id: self.id.clone(),
			role: self.role,
			workspace_id: self.workspace_id.clone(),
		}
	}
}
