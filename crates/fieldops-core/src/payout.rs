//! Payout recalculation engine.
//!
//! Keeps the payout record of an order consistent with the current photo
//! evidence and the order's status. `recalculate` is a pure function of
//! durable state: it is idempotent and must run after any mutation that
//! can change its inputs (status transition, photo upload, photo review).
//!
//! Work-type prices are read here, at recalculation time, and never
//! snapshotted at upload time. Re-pricing or deactivating a work type
//! therefore retroactively changes the totals of any order that has not
//! been finalized.

use crate::error::CoreError;
use dashmap::DashMap;
use fieldops_storage::{StorageError, StorageService};
use fieldops_types::{
	Identity, Order, OrderItem, Payout, PayoutSnapshot, PayoutStatus, Photo, PhotoStatus, Role,
	StorageKey, WorkType,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;

/// Recomputes and persists payout records.
pub struct PayoutEngine {
	storage: Arc<StorageService>,
	/// Per-order locks serializing the read-aggregate-write sequence, so
	/// two concurrent triggers for the same order cannot interleave into a
	/// partial merge. The payout record is keyed by order id, which keeps
	/// at-most-one row per order structural.
	recalc_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PayoutEngine {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self {
			storage,
			recalc_locks: DashMap::new(),
		}
	}

	fn lock_for(&self, order_id: &str) -> Arc<Mutex<()>> {
		self.recalc_locks
			.entry(order_id.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	/// Loads the items belonging to an order.
	async fn order_items(&self, order: &Order) -> Result<Vec<OrderItem>, CoreError> {
		let items: Vec<OrderItem> = self
			.storage
			.retrieve_all(StorageKey::OrderItems.as_str())
			.await?;
		Ok(items
			.into_iter()
			.filter(|item| item.order_id == order.id)
			.collect())
	}

	/// Computes the payout snapshot for an order without persisting it.
	///
	/// Matches every photo whose item belongs to the order, restricted to
	/// the order's workspace on both the photo and the work type — a
	/// defense against cross-tenant leakage at the join level even though
	/// upstream scoping should already guarantee it. Every matched photo
	/// counts toward the preliminary amount; only accepted ones count
	/// toward the final amount.
	pub async fn compute(&self, order: &Order) -> Result<PayoutSnapshot, CoreError> {
		let items = self.order_items(order).await?;
		let item_ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();

		let photos: Vec<Photo> = self
			.storage
			.retrieve_all(StorageKey::Photos.as_str())
			.await?;

		let mut work_types: HashMap<String, Option<WorkType>> = HashMap::new();
		let mut preliminary = Decimal::ZERO;
		let mut accepted = Decimal::ZERO;

		for photo in photos {
			if photo.workspace_id != order.workspace_id
				|| !item_ids.contains(photo.order_item_id.as_str())
			{
				continue;
			}

			let work_type = match work_types.get(&photo.work_type_id) {
				Some(cached) => cached.clone(),
				None => {
					let loaded = match self
						.storage
						.retrieve::<WorkType>(StorageKey::WorkTypes.as_str(), &photo.work_type_id)
						.await
					{
						Ok(wt) => Some(wt),
						Err(StorageError::NotFound) => None,
						Err(e) => return Err(e.into()),
					};
					work_types.insert(photo.work_type_id.clone(), loaded.clone());
					loaded
				},
			};

			// A photo whose work type is missing or cross-workspace drops
			// out of the join entirely
			let Some(work_type) = work_type else { continue };
			if work_type.workspace_id != order.workspace_id {
				continue;
			}

			preliminary += work_type.price_per_unit;
			if photo.status == PhotoStatus::Accepted {
				accepted += work_type.price_per_unit;
			}
		}

		Ok(PayoutSnapshot {
			order_id: order.id.clone(),
			amount_preliminary: preliminary,
			amount_final: accepted,
			status: PayoutStatus::for_order(order.status),
		})
	}

	/// Recomputes the payout for an order and persists it.
	///
	/// Creates the payout record lazily on first recalculation, taking
	/// workspace and promoter from the order. Safe to call repeatedly.
	#[instrument(skip_all, fields(order_id = %order.id))]
	pub async fn recalculate(&self, order: &Order) -> Result<PayoutSnapshot, CoreError> {
		let lock = self.lock_for(&order.id);
		let _guard = lock.lock().await;

		let snapshot = self.compute(order).await?;

		let mut payout = match self
			.storage
			.retrieve::<Payout>(StorageKey::Payouts.as_str(), &order.id)
			.await
		{
			Ok(existing) => existing,
			Err(StorageError::NotFound) => Payout {
				id: Uuid::new_v4().to_string(),
				workspace_id: order.workspace_id.clone(),
				order_id: order.id.clone(),
				promoter_id: order.promoter_id.clone(),
				amount_preliminary: Decimal::ZERO,
				amount_final: Decimal::ZERO,
				status: PayoutStatus::Review,
			},
			Err(e) => return Err(e.into()),
		};

		payout.promoter_id = order.promoter_id.clone();
		payout.amount_preliminary = snapshot.amount_preliminary;
		payout.amount_final = snapshot.amount_final;
		payout.status = snapshot.status;

		self.storage
			.store(StorageKey::Payouts.as_str(), &order.id, &payout)
			.await?;

		tracing::debug!(
			amount_preliminary = %payout.amount_preliminary,
			amount_final = %payout.amount_final,
			status = %payout.status,
			"recalculated payout"
		);

		Ok(snapshot)
	}

	/// Returns the payout for an order, if one has been calculated.
	pub async fn find_by_order(&self, order_id: &str) -> Result<Option<Payout>, CoreError> {
		match self
			.storage
			.retrieve::<Payout>(StorageKey::Payouts.as_str(), order_id)
			.await
		{
			Ok(payout) => Ok(Some(payout)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	/// Lists payouts visible to the actor: workspace-scoped, and promoters
	/// only see their own.
	pub async fn list(&self, actor: &Identity) -> Result<Vec<Payout>, CoreError> {
		let payouts: Vec<Payout> = self
			.storage
			.retrieve_all(StorageKey::Payouts.as_str())
			.await?;
		Ok(payouts
			.into_iter()
			.filter(|p| p.workspace_id == actor.workspace_id)
			.filter(|p| {
				actor.role != Role::Promoter
					|| p.promoter_id.as_deref() == Some(actor.user_id.as_str())
			})
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use crate::testutil::{dec, setup, TestContext};
	use fieldops_types::{PayoutStatus, ReviewDecision};

	#[tokio::test]
	async fn test_zero_photos_yields_zero_amounts() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;

		let snapshot = ctx.ops.payouts().recalculate(&order).await.unwrap();
		assert_eq!(snapshot.amount_preliminary, dec("0"));
		assert_eq!(snapshot.amount_final, dec("0"));
		assert_eq!(snapshot.status, PayoutStatus::Review);
	}

	#[tokio::test]
	async fn test_recalculate_is_idempotent() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		let item_id = ctx.first_item_id(&order).await;
		ctx.upload_photo(&item_id, &ctx.wash_windows_id, "hash-a")
			.await;

		let first = ctx.ops.payouts().recalculate(&order).await.unwrap();
		let second = ctx.ops.payouts().recalculate(&order).await.unwrap();
		assert_eq!(first, second);
	}

	#[tokio::test]
	async fn test_final_never_exceeds_preliminary() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		let item_id = ctx.first_item_id(&order).await;

		let accepted = ctx
			.upload_photo(&item_id, &ctx.wash_windows_id, "hash-a")
			.await;
		ctx.upload_photo(&item_id, &ctx.hang_poster_id, "hash-b")
			.await;
		ctx.review_photo(&accepted, ReviewDecision::Accepted).await;

		let snapshot = ctx.ops.payouts().recalculate(&order).await.unwrap();
		assert!(snapshot.amount_final <= snapshot.amount_preliminary);
		assert_eq!(snapshot.amount_preliminary, dec("17.50"));
		assert_eq!(snapshot.amount_final, dec("10.00"));
	}

	#[tokio::test]
	async fn test_rejected_photo_counts_toward_preliminary_only() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		let item_id = ctx.first_item_id(&order).await;

		let photo_id = ctx
			.upload_photo(&item_id, &ctx.wash_windows_id, "hash-a")
			.await;
		ctx.review_photo(&photo_id, ReviewDecision::Rejected).await;

		let snapshot = ctx.ops.payouts().recalculate(&order).await.unwrap();
		assert_eq!(snapshot.amount_preliminary, dec("10.00"));
		assert_eq!(snapshot.amount_final, dec("0"));
	}

	#[tokio::test]
	async fn test_orders_do_not_leak_into_each_other() {
		let ctx = setup().await;
		let order_a = ctx.create_assigned_order().await;
		let order_b = ctx.create_assigned_order().await;

		let item_a = ctx.first_item_id(&order_a).await;
		let item_b = ctx.first_item_id(&order_b).await;

		let photo_a = ctx
			.upload_photo(&item_a, &ctx.wash_windows_id, "hash-a")
			.await;
		let photo_b = ctx
			.upload_photo(&item_b, &ctx.wash_windows_id, "hash-b")
			.await;
		ctx.review_photo(&photo_a, ReviewDecision::Accepted).await;
		ctx.review_photo(&photo_b, ReviewDecision::Accepted).await;

		let snapshot = ctx.ops.payouts().recalculate(&order_a).await.unwrap();
		assert_eq!(snapshot.amount_preliminary, dec("10.00"));
		assert_eq!(snapshot.amount_final, dec("10.00"));
	}

	#[tokio::test]
	async fn test_repricing_changes_unfinalized_totals() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		let item_id = ctx.first_item_id(&order).await;
		let photo_id = ctx
			.upload_photo(&item_id, &ctx.wash_windows_id, "hash-a")
			.await;
		ctx.review_photo(&photo_id, ReviewDecision::Accepted).await;

		let before = ctx.ops.payouts().recalculate(&order).await.unwrap();
		assert_eq!(before.amount_final, dec("10.00"));

		// Price is read at recalculation time, so re-pricing the work type
		// retroactively changes the totals
		ctx.ops
			.catalog()
			.update_work_type(
				&ctx.operator,
				&ctx.wash_windows_id,
				Some(dec("12.00")),
				None,
			)
			.await
			.unwrap();

		let after = ctx.ops.payouts().recalculate(&order).await.unwrap();
		assert_eq!(after.amount_preliminary, dec("12.00"));
		assert_eq!(after.amount_final, dec("12.00"));
	}

	#[tokio::test]
	async fn test_promoter_lists_only_own_payouts() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		ctx.ops.payouts().recalculate(&order).await.unwrap();

		let own = ctx.ops.payouts().list(&ctx.promoter).await.unwrap();
		assert_eq!(own.len(), 1);

		let other = TestContext::promoter_identity(&ctx, "someone-else");
		let none = ctx.ops.payouts().list(&other).await.unwrap();
		assert!(none.is_empty());
	}
}
