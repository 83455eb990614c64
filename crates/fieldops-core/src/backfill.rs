//! Batch payout backfill.
//!
//! Walks every stored order and recalculates its payout. Because
//! recalculation is idempotent the walk can be repeated safely; dry-run
//! mode aggregates without persisting anything.

use crate::error::CoreError;
use crate::OpsService;
use fieldops_types::{Order, StorageKey};

/// Outcome of a backfill run.
#[derive(Debug, Clone, Copy)]
pub struct BackfillReport {
	/// Number of orders processed.
	pub processed: usize,
}

impl OpsService {
	/// Recalculates the payout of every order, oldest first.
	///
	/// With `dry_run` set the amounts are computed but nothing is
	/// persisted.
	pub async fn backfill_payouts(&self, dry_run: bool) -> Result<BackfillReport, CoreError> {
		let mut orders: Vec<Order> = self
			.storage()
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		orders.sort_by(|a, b| a.created_at.cmp(&b.created_at));

		let mut processed = 0;
		for order in &orders {
			if dry_run {
				self.payouts().compute(order).await?;
			} else {
				self.payouts().recalculate(order).await?;
			}
			processed += 1;
		}

		tracing::info!(processed, dry_run, "payout backfill finished");
		Ok(BackfillReport { processed })
	}
}

#[cfg(test)]
mod tests {
	use crate::testutil::setup;

	#[tokio::test]
	async fn test_backfill_processes_every_order() {
		let ctx = setup().await;
		let order_a = ctx.create_assigned_order().await;
		let order_b = ctx.create_assigned_order().await;

		let report = ctx.ops.backfill_payouts(false).await.unwrap();
		assert_eq!(report.processed, 2);

		for order_id in [&order_a.id, &order_b.id] {
			assert!(ctx
				.ops
				.payouts()
				.find_by_order(order_id)
				.await
				.unwrap()
				.is_some());
		}
	}

	#[tokio::test]
	async fn test_dry_run_persists_nothing() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;

		let report = ctx.ops.backfill_payouts(true).await.unwrap();
		assert_eq!(report.processed, 1);
		assert!(ctx
			.ops
			.payouts()
			.find_by_order(&order.id)
			.await
			.unwrap()
			.is_none());
	}
}
