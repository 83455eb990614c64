//! Storage-related types for the fieldops backend.

use std::str::FromStr;

/// Storage namespaces for the persistent collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Namespace for order records
	Orders,
	/// Namespace for order item records
	OrderItems,
	/// Namespace for photo evidence records
	Photos,
	/// Namespace for work type records
	WorkTypes,
	/// Namespace for address records
	Addresses,
	/// Namespace for user records
	Users,
	/// Namespace for payout records, keyed by order id
	Payouts,
}

impl StorageKey {
	/// Returns the string representation of the storage namespace.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::OrderItems => "order_items",
			StorageKey::Photos => "photos",
			StorageKey::WorkTypes => "work_types",
			StorageKey::Addresses => "addresses",
			StorageKey::Users => "users",
			StorageKey::Payouts => "payouts",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::OrderItems,
			Self::Photos,
			Self::WorkTypes,
			Self::Addresses,
			Self::Users,
			Self::Payouts,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"order_items" => Ok(Self::OrderItems),
			"photos" => Ok(Self::Photos),
			"work_types" => Ok(Self::WorkTypes),
			"addresses" => Ok(Self::Addresses),
			"users" => Ok(Self::Users),
			"payouts" => Ok(Self::Payouts),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
