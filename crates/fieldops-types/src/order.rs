//! Work-order types for the fieldops backend.
//!
//! This module defines orders, their address-scoped items, and the order
//! status enum whose transitions are governed by the lifecycle state
//! machine in fieldops-core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of assigned promotional/installation work.
///
/// Orders are created by operators, optionally assigned to a promoter, and
/// move through the status pipeline exclusively via the lifecycle
/// transition operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// Workspace (tenant) this order belongs to.
	pub workspace_id: String,
	/// Assigned promoter, if any. Orders may stay unassigned in Draft.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub promoter_id: Option<String>,
	/// Operator who created the order.
	pub created_by: String,
	/// Short human-readable title.
	pub title: String,
	/// Free-text comment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Optional deadline for the work.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deadline_at: Option<DateTime<Utc>>,
	/// Current status of the order.
	pub status: OrderStatus,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
}

/// One address within an order.
///
/// Items are owned exclusively by their order. `work_type_ids` is sorted
/// and deduplicated at creation, so each (item, work type) pair occurs at
/// most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
	/// Unique identifier for this item.
	pub id: String,
	/// Order this item belongs to.
	pub order_id: String,
	/// Address where the work happens.
	pub address_id: String,
	/// Free-text comment for the item.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Work types applicable to this item, sorted and deduplicated.
	pub work_type_ids: Vec<String>,
}

/// Input payload for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
	/// Short human-readable title.
	pub title: String,
	/// Free-text comment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Optional deadline for the work.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub deadline_at: Option<DateTime<Utc>>,
	/// Promoter to assign; required when `status` is Assigned.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub promoter_id: Option<String>,
	/// Initial status; only Draft or Assigned are accepted.
	pub status: OrderStatus,
	/// Address-scoped items of the order.
	pub items: Vec<NewOrderItem>,
}

/// Input payload for one item of a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
	/// Address where the work happens.
	pub address_id: String,
	/// Free-text comment for the item.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
	/// Work types to perform at the address. Duplicates are collapsed.
	pub work_type_ids: Vec<String>,
}

/// Status of an order in its lifecycle pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
	/// Order is being drafted and is not yet visible work.
	Draft,
	/// Order is assigned to a promoter but work has not started.
	Assigned,
	/// The promoter is performing the work.
	InProgress,
	/// Work is done and awaits operator review.
	Review,
	/// Review passed; the payout is due.
	Payment,
	/// Order is paid out and closed (terminal).
	Completed,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderStatus::Draft => write!(f, "Draft"),
			OrderStatus::Assigned => write!(f, "Assigned"),
			OrderStatus::InProgress => write!(f, "InProgress"),
			OrderStatus::Review => write!(f, "Review"),
			OrderStatus::Payment => write!(f, "Payment"),
			OrderStatus::Completed => write!(f, "Completed"),
		}
	}
}
