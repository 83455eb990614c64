//! Derived payout records.
//!
//! A payout is the financial summary of one order, recomputed from photo
//! evidence by the payout engine. It is never edited directly: both
//! amounts and the status are derived state.

use crate::order::OrderStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived financial record, one per order, created lazily on first
/// recalculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
	/// Unique identifier for this payout.
	pub id: String,
	/// Workspace this payout belongs to.
	pub workspace_id: String,
	/// Order this payout summarizes. At most one payout exists per order.
	pub order_id: String,
	/// Promoter earning the payout, mirroring the order's assignment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub promoter_id: Option<String>,
	/// Sum of work-type prices over every photo of the order, regardless
	/// of review status.
	pub amount_preliminary: Decimal,
	/// Sum restricted to accepted photos. Never exceeds the preliminary
	/// amount.
	pub amount_final: Decimal,
	/// Derived from the order status, never set independently.
	pub status: PayoutStatus,
}

/// Status of a payout, a pure function of the order status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
	/// Order has not reached the payment stage yet.
	Review,
	/// Order is in Payment: the amount is due.
	ToPay,
	/// Order is Completed: the amount has been paid.
	Paid,
}

impl PayoutStatus {
	/// Maps an order status to the payout status it implies.
	pub fn for_order(status: OrderStatus) -> Self {
		match status {
			OrderStatus::Payment => PayoutStatus::ToPay,
			OrderStatus::Completed => PayoutStatus::Paid,
			_ => PayoutStatus::Review,
		}
	}
}

impl fmt::Display for PayoutStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PayoutStatus::Review => write!(f, "on_review"),
			PayoutStatus::ToPay => write!(f, "to_pay"),
			PayoutStatus::Paid => write!(f, "paid"),
		}
	}
}

/// Result of one payout recalculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutSnapshot {
	/// Order the snapshot was computed for.
	pub order_id: String,
	/// Preliminary amount at computation time.
	pub amount_preliminary: Decimal,
	/// Final (accepted-only) amount at computation time.
	pub amount_final: Decimal,
	/// Payout status implied by the order status.
	pub status: PayoutStatus,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(
			PayoutStatus::for_order(OrderStatus::Payment),
			PayoutStatus::ToPay
		);
		assert_eq!(
			PayoutStatus::for_order(OrderStatus::Completed),
			PayoutStatus::Paid
		);
		for status in [
			OrderStatus::Draft,
			OrderStatus::Assigned,
			OrderStatus::InProgress,
			OrderStatus::Review,
		] {
			assert_eq!(PayoutStatus::for_order(status), PayoutStatus::Review);
		}
	}
}
