//! Workspace catalog types: priced work types and addresses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A priced category of billable work, scoped to a workspace.
///
/// The price is read at payout recalculation time, never snapshotted at
/// upload time, so re-pricing a work type changes the totals of any order
/// that has not been finalized yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkType {
	/// Unique identifier for this work type.
	pub id: String,
	/// Workspace this work type belongs to.
	pub workspace_id: String,
	/// Name, unique within the workspace.
	pub name: String,
	/// Price paid per photographed unit of work.
	pub price_per_unit: Decimal,
	/// Whether the work type can be attached to new orders.
	pub is_active: bool,
}

/// An address where field work can be assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
	/// Unique identifier for this address.
	pub id: String,
	/// Workspace this address belongs to.
	pub workspace_id: String,
	/// City district, if known.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub district: Option<String>,
	/// Street name.
	pub street: String,
	/// Building number or designation.
	pub building: String,
	/// Latitude, if geocoded.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lat: Option<f64>,
	/// Longitude, if geocoded.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lng: Option<f64>,
	/// Free-text comment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}

/// Input payload for creating an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAddress {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub district: Option<String>,
	pub street: String,
	pub building: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lat: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub lng: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}
