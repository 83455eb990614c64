//! Workspace catalog service: addresses and priced work types.
//!
//! Routine data-access glue around the records the payout engine and
//! order validation consume. Mutations are operator-only; reads are open
//! to any workspace member.

use crate::error::CoreError;
use crate::guards;
use fieldops_storage::StorageService;
use fieldops_types::{Address, Identity, NewAddress, Role, StorageKey, WorkType};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Service managing the workspace catalog.
pub struct CatalogService {
	storage: Arc<StorageService>,
}

impl CatalogService {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Creates a work type. The name must be unique within the workspace.
	pub async fn add_work_type(
		&self,
		actor: &Identity,
		name: &str,
		price_per_unit: Decimal,
	) -> Result<WorkType, CoreError> {
		guards::require_role(actor, Role::Operator, "only operators manage work types")?;

		if name.trim().is_empty() {
			return Err(CoreError::Validation("work type name must not be empty".into()));
		}
		let existing = self.list_work_types(actor).await?;
		if existing.iter().any(|wt| wt.name == name) {
			return Err(CoreError::Validation(
				"work type name already exists in workspace".into(),
			));
		}

		let work_type = WorkType {
			id: Uuid::new_v4().to_string(),
			workspace_id: actor.workspace_id.clone(),
			name: name.to_string(),
			price_per_unit,
			is_active: true,
		};
		self.storage
			.store(StorageKey::WorkTypes.as_str(), &work_type.id, &work_type)
			.await?;
		Ok(work_type)
	}

	/// Re-prices or (de)activates a work type.
	///
	/// Re-pricing retroactively changes the payout totals of any order
	/// that has not been finalized, because prices are read at
	/// recalculation time.
	pub async fn update_work_type(
		&self,
		actor: &Identity,
		work_type_id: &str,
		price_per_unit: Option<Decimal>,
		is_active: Option<bool>,
	) -> Result<WorkType, CoreError> {
		guards::require_role(actor, Role::Operator, "only operators manage work types")?;

		let mut work_type: WorkType = self
			.storage
			.retrieve(StorageKey::WorkTypes.as_str(), work_type_id)
			.await
			.map_err(|e| CoreError::from_lookup(e, "work type"))?;
		if work_type.workspace_id != actor.workspace_id {
			return Err(CoreError::NotFound("work type"));
		}

		if let Some(price) = price_per_unit {
			work_type.price_per_unit = price;
		}
		if let Some(active) = is_active {
			work_type.is_active = active;
		}

		self.storage
			.update(StorageKey::WorkTypes.as_str(), work_type_id, &work_type)
			.await?;
		Ok(work_type)
	}

	/// Lists work types in the actor's workspace.
	pub async fn list_work_types(&self, actor: &Identity) -> Result<Vec<WorkType>, CoreError> {
		let work_types: Vec<WorkType> = self
			.storage
			.retrieve_all(StorageKey::WorkTypes.as_str())
			.await?;
		Ok(work_types
			.into_iter()
			.filter(|wt| wt.workspace_id == actor.workspace_id)
			.collect())
	}

	/// Creates an address in the actor's workspace.
	pub async fn add_address(
		&self,
		actor: &Identity,
		new: NewAddress,
	) -> Result<Address, CoreError> {
		guards::require_role(actor, Role::Operator, "only operators manage addresses")?;

		let address = Address {
			id: Uuid::new_v4().to_string(),
			workspace_id: actor.workspace_id.clone(),
			district: new.district,
			street: new.street,
			building: new.building,
			lat: new.lat,
			lng: new.lng,
			comment: new.comment,
		};
		self.storage
			.store(StorageKey::Addresses.as_str(), &address.id, &address)
			.await?;
		Ok(address)
	}

	/// Lists addresses in the actor's workspace.
	pub async fn list_addresses(&self, actor: &Identity) -> Result<Vec<Address>, CoreError> {
		let addresses: Vec<Address> = self
			.storage
			.retrieve_all(StorageKey::Addresses.as_str())
			.await?;
		Ok(addresses
			.into_iter()
			.filter(|a| a.workspace_id == actor.workspace_id)
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use crate::error::CoreError;
	use crate::testutil::{dec, setup};

	#[tokio::test]
	async fn test_work_type_names_unique_per_workspace() {
		let ctx = setup().await;
		let err = ctx
			.ops
			.catalog()
			.add_work_type(&ctx.operator, "wash windows", dec("5.00"))
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Validation(_)));
	}

	#[tokio::test]
	async fn test_promoter_cannot_manage_catalog() {
		let ctx = setup().await;
		let err = ctx
			.ops
			.catalog()
			.add_work_type(&ctx.promoter, "new work", dec("1.00"))
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Forbidden(_)));
	}

	#[tokio::test]
	async fn test_deactivation_keeps_the_record() {
		let ctx = setup().await;
		let updated = ctx
			.ops
			.catalog()
			.update_work_type(&ctx.operator, &ctx.wash_windows_id, None, Some(false))
			.await
			.unwrap();
		assert!(!updated.is_active);
		assert_eq!(updated.price_per_unit, dec("10.00"));
	}
}
