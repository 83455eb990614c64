//! Access gates applied uniformly across the order-scoped operations.
//!
//! Workspace mismatches are masked as NotFound so a caller cannot probe
//! for entities in foreign tenants. The promoter ownership gate runs
//! before any transition or photo logic.

use crate::error::CoreError;
use fieldops_types::{Identity, Order, Role};

/// Requires the actor to hold the given role.
pub(crate) fn require_role(actor: &Identity, role: Role, action: &'static str) -> Result<(), CoreError> {
	if actor.role != role {
		return Err(CoreError::Forbidden(action));
	}
	Ok(())
}

/// Checks that the actor may see and act on the order.
///
/// Orders in a foreign workspace read as missing; promoters may only touch
/// orders assigned to them.
pub(crate) fn ensure_order_visible(order: &Order, actor: &Identity) -> Result<(), CoreError> {
	if order.workspace_id != actor.workspace_id {
		return Err(CoreError::NotFound("order"));
	}
	if actor.role == Role::Promoter && order.promoter_id.as_deref() != Some(actor.user_id.as_str())
	{
		return Err(CoreError::Forbidden("order is assigned to another promoter"));
	}
	Ok(())
}
