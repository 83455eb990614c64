//! Order state machine implementation.
//!
//! Manages order state transitions with validation. Orders move along the
//! pipeline Draft -> Assigned -> InProgress -> Review -> Payment ->
//! Completed, with operators allowed to step one stage back anywhere
//! before Completed. Promoters hold a narrower authority: they may only
//! progress their own work forward through the two transitions
//! Assigned -> InProgress and InProgress -> Review.
//!
//! Both permission tables are static data so they stay independently
//! testable and auditable.

use crate::error::CoreError;
use chrono::Utc;
use fieldops_storage::StorageService;
use fieldops_types::{Order, OrderStatus, StorageKey};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Base transition table: each state maps to the set of states an operator
/// may move it to. Completed is terminal.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Draft,
		HashSet::from([OrderStatus::Assigned]),
	);
	m.insert(
		OrderStatus::Assigned,
		HashSet::from([OrderStatus::InProgress, OrderStatus::Draft]),
	);
	m.insert(
		OrderStatus::InProgress,
		HashSet::from([OrderStatus::Review, OrderStatus::Assigned]),
	);
	m.insert(
		OrderStatus::Review,
		HashSet::from([OrderStatus::Payment, OrderStatus::InProgress]),
	);
	m.insert(
		OrderStatus::Payment,
		HashSet::from([OrderStatus::Completed, OrderStatus::Review]),
	);
	m.insert(OrderStatus::Completed, HashSet::new()); // terminal
	m
});

/// Restricted table for promoter actors: forward progress on their own
/// work only, never backward.
static PROMOTER_TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::Assigned,
		HashSet::from([OrderStatus::InProgress]),
	);
	m.insert(
		OrderStatus::InProgress,
		HashSet::from([OrderStatus::Review]),
	);
	m
});

/// Manages order state transitions and persistence
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
}

impl OrderStateMachine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Checks if a state transition is valid for an operator.
	pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
		TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
	}

	/// Checks if a promoter may perform the transition. The pair must also
	/// be valid per the base table; this is the additional restriction.
	pub fn promoter_may_transition(from: OrderStatus, to: OrderStatus) -> bool {
		PROMOTER_TRANSITIONS
			.get(&from)
			.is_some_and(|set| set.contains(&to))
	}

	/// Returns the allowed target states for a given state.
	pub fn allowed_targets(from: OrderStatus) -> HashSet<OrderStatus> {
		TRANSITIONS.get(&from).cloned().unwrap_or_default()
	}

	/// Gets an order by ID
	pub async fn get_order(&self, order_id: &str) -> Result<Order, CoreError> {
		self.storage
			.retrieve(StorageKey::Orders.as_str(), order_id)
			.await
			.map_err(|e| CoreError::from_lookup(e, "order"))
	}

	/// Stores an order record, overwriting any existing one
	pub async fn store_order(&self, order: &Order) -> Result<(), CoreError> {
		self.storage
			.store(StorageKey::Orders.as_str(), &order.id, order)
			.await?;
		Ok(())
	}

	/// Updates an order with a closure and persists it
	pub async fn update_order_with<F>(&self, order_id: &str, updater: F) -> Result<Order, CoreError>
	where
		F: FnOnce(&mut Order),
	{
		let mut order = self.get_order(order_id).await?;

		// Apply the update
		updater(&mut order);

		// Automatically set updated_at timestamp
		order.updated_at = Utc::now();

		self.storage
			.update(StorageKey::Orders.as_str(), order_id, &order)
			.await?;

		Ok(order)
	}
}
