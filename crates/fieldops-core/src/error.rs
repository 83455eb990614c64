//! Error taxonomy shared by the core services.
//!
//! Every core error is terminal for the triggering operation; there are no
//! internal retries. The calling layer maps each kind to a protocol-level
//! response.

use fieldops_storage::StorageError;
use fieldops_types::OrderStatus;
use thiserror::Error;

/// Errors surfaced by the core services.
#[derive(Debug, Error)]
pub enum CoreError {
	/// The referenced entity does not exist or does not belong to the
	/// caller's workspace.
	#[error("{0} not found")]
	NotFound(&'static str),
	/// The actor lacks authority for the requested action.
	#[error("forbidden: {0}")]
	Forbidden(&'static str),
	/// The requested target status is not reachable from the current one.
	#[error("invalid order status transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	/// Malformed or semantically invalid input.
	#[error("validation error: {0}")]
	Validation(String),
	/// Storage transport failure.
	#[error("storage error: {0}")]
	Storage(#[from] StorageError),
}

impl CoreError {
	/// Maps a storage lookup error, turning the backend's NotFound into the
	/// domain-level NotFound for the given entity.
	pub(crate) fn from_lookup(err: StorageError, entity: &'static str) -> Self {
		match err {
			StorageError::NotFound => CoreError::NotFound(entity),
			other => CoreError::Storage(other),
		}
	}
}
