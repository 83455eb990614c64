//! Order lifecycle service.
//!
//! Creation validates and normalizes operator input; the `set_status`
//! operation is the single entry point for moving an order along its
//! pipeline. Every successful transition recalculates the payout in
//! lockstep, and a recalculation failure rolls the status change back so
//! the two never commit separately.

use crate::error::CoreError;
use crate::guards;
use crate::payout::PayoutEngine;
use crate::state::OrderStateMachine;
use chrono::Utc;
use fieldops_storage::{StorageError, StorageService};
use fieldops_types::{
	Address, Identity, NewOrder, Order, OrderItem, OrderStatus, Role, StorageKey, User, WorkType,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// An order together with its address-scoped items.
#[derive(Debug, Clone)]
pub struct OrderDetail {
	pub order: Order,
	pub items: Vec<OrderItem>,
}

/// Service handling order creation, reads, and lifecycle transitions.
pub struct OrderService {
	storage: Arc<StorageService>,
	state_machine: Arc<OrderStateMachine>,
	payouts: Arc<PayoutEngine>,
}

impl OrderService {
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<OrderStateMachine>,
		payouts: Arc<PayoutEngine>,
	) -> Self {
		Self {
			storage,
			state_machine,
			payouts,
		}
	}

	/// Creates an order with its items. Operator-only.
	///
	/// Initial status must be Draft or Assigned. Every referenced
	/// promoter, address, and work type must resolve inside the operator's
	/// workspace. Duplicate work-type ids on an item are collapsed rather
	/// than rejected.
	#[instrument(skip_all, fields(workspace_id = %actor.workspace_id))]
	pub async fn create(&self, actor: &Identity, new: NewOrder) -> Result<Order, CoreError> {
		guards::require_role(actor, Role::Operator, "only operators create orders")?;

		if !matches!(new.status, OrderStatus::Draft | OrderStatus::Assigned) {
			return Err(CoreError::Validation(
				"new order can only start as Draft or Assigned".into(),
			));
		}

		if let Some(promoter_id) = &new.promoter_id {
			let promoter: User = self
				.storage
				.retrieve(StorageKey::Users.as_str(), promoter_id)
				.await
				.map_err(|e| CoreError::from_lookup(e, "promoter"))?;
			if promoter.workspace_id != actor.workspace_id {
				return Err(CoreError::NotFound("promoter"));
			}
			if promoter.role != Role::Promoter {
				return Err(CoreError::Validation(
					"promoter_id must point to a promoter user".into(),
				));
			}
		} else if new.status == OrderStatus::Assigned {
			return Err(CoreError::Validation(
				"an Assigned order requires a promoter".into(),
			));
		}

		// Normalize and validate the items before anything is written
		let mut items = Vec::with_capacity(new.items.len());
		for item in new.items {
			self.ensure_address_in_workspace(&item.address_id, actor)
				.await?;

			let mut work_type_ids = item.work_type_ids;
			work_type_ids.sort();
			work_type_ids.dedup();
			for work_type_id in &work_type_ids {
				self.ensure_work_type_in_workspace(work_type_id, actor)
					.await?;
			}

			items.push(OrderItem {
				id: Uuid::new_v4().to_string(),
				order_id: String::new(), // filled in below
				address_id: item.address_id,
				comment: item.comment,
				work_type_ids,
			});
		}

		let now = Utc::now();
		let order = Order {
			id: Uuid::new_v4().to_string(),
			workspace_id: actor.workspace_id.clone(),
			promoter_id: new.promoter_id,
			created_by: actor.user_id.clone(),
			title: new.title,
			comment: new.comment,
			deadline_at: new.deadline_at,
			status: new.status,
			created_at: now,
			updated_at: now,
		};

		self.state_machine.store_order(&order).await?;
		for mut item in items {
			item.order_id = order.id.clone();
			self.storage
				.store(StorageKey::OrderItems.as_str(), &item.id, &item)
				.await?;
		}

		tracing::info!(order_id = %order.id, status = %order.status, "created order");
		Ok(order)
	}

	/// Returns an order with its items, applying the uniform access gate.
	pub async fn get(&self, actor: &Identity, order_id: &str) -> Result<OrderDetail, CoreError> {
		let order = self.state_machine.get_order(order_id).await?;
		guards::ensure_order_visible(&order, actor)?;

		let mut items: Vec<OrderItem> = self
			.storage
			.retrieve_all(StorageKey::OrderItems.as_str())
			.await?;
		items.retain(|item| item.order_id == order.id);

		Ok(OrderDetail { order, items })
	}

	/// Lists orders in the actor's workspace, newest first. Promoters only
	/// see orders assigned to them.
	pub async fn list(&self, actor: &Identity) -> Result<Vec<Order>, CoreError> {
		let mut orders: Vec<Order> = self
			.storage
			.retrieve_all(StorageKey::Orders.as_str())
			.await?;
		orders.retain(|order| order.workspace_id == actor.workspace_id);
		if actor.role == Role::Promoter {
			orders.retain(|order| order.promoter_id.as_deref() == Some(actor.user_id.as_str()));
		}
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Requests a status transition on an order.
	///
	/// A request for the current status is an idempotent no-op and does
	/// not trigger recalculation. Otherwise the transition must be legal
	/// per the base table, and promoters are further restricted to the
	/// forward transitions on their own orders.
	#[instrument(skip_all, fields(order_id = %order_id, target = %target))]
	pub async fn set_status(
		&self,
		actor: &Identity,
		order_id: &str,
		target: OrderStatus,
	) -> Result<OrderStatus, CoreError> {
		let order = self.state_machine.get_order(order_id).await?;
		guards::ensure_order_visible(&order, actor)?;

		if order.status == target {
			return Ok(order.status);
		}

		if !OrderStateMachine::is_valid_transition(order.status, target) {
			return Err(CoreError::InvalidTransition {
				from: order.status,
				to: target,
			});
		}

		if actor.role == Role::Promoter
			&& !OrderStateMachine::promoter_may_transition(order.status, target)
		{
			return Err(CoreError::Forbidden(
				"promoter cannot perform this transition",
			));
		}

		let previous = order;
		let updated = self
			.state_machine
			.update_order_with(order_id, |o| o.status = target)
			.await?;

		// The status change and the payout recalculation commit together;
		// if recalculation fails the prior order record is restored
		if let Err(err) = self.payouts.recalculate(&updated).await {
			self.state_machine.store_order(&previous).await?;
			return Err(err);
		}

		tracing::info!(from = %previous.status, "order status changed");
		Ok(target)
	}

	async fn ensure_address_in_workspace(
		&self,
		address_id: &str,
		actor: &Identity,
	) -> Result<(), CoreError> {
		let address: Address = match self
			.storage
			.retrieve(StorageKey::Addresses.as_str(), address_id)
			.await
		{
			Ok(address) => address,
			Err(StorageError::NotFound) => {
				return Err(CoreError::Validation(
					"one or more addresses do not belong to workspace".into(),
				))
			},
			Err(e) => return Err(e.into()),
		};
		if address.workspace_id != actor.workspace_id {
			return Err(CoreError::Validation(
				"one or more addresses do not belong to workspace".into(),
			));
		}
		Ok(())
	}

	async fn ensure_work_type_in_workspace(
		&self,
		work_type_id: &str,
		actor: &Identity,
	) -> Result<(), CoreError> {
		let work_type: WorkType = match self
			.storage
			.retrieve(StorageKey::WorkTypes.as_str(), work_type_id)
			.await
		{
			Ok(work_type) => work_type,
			Err(StorageError::NotFound) => {
				return Err(CoreError::Validation(
					"one or more work types do not belong to workspace".into(),
				))
			},
			Err(e) => return Err(e.into()),
		};
		if work_type.workspace_id != actor.workspace_id {
			return Err(CoreError::Validation(
				"one or more work types do not belong to workspace".into(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::error::CoreError;
	use crate::testutil::{dec, setup};
	use fieldops_types::{NewOrder, NewOrderItem, OrderStatus, PayoutStatus, ReviewDecision};

	#[tokio::test]
	async fn test_duplicate_work_types_are_collapsed() {
		let ctx = setup().await;
		let order = ctx
			.ops
			.orders()
			.create(
				&ctx.operator,
				NewOrder {
					title: "poster run".into(),
					comment: None,
					deadline_at: None,
					promoter_id: Some(ctx.promoter.user_id.clone()),
					status: OrderStatus::Assigned,
					items: vec![NewOrderItem {
						address_id: ctx.address_id.clone(),
						comment: None,
						work_type_ids: vec![
							ctx.wash_windows_id.clone(),
							ctx.wash_windows_id.clone(),
							ctx.hang_poster_id.clone(),
						],
					}],
				},
			)
			.await
			.unwrap();

		let detail = ctx.ops.orders().get(&ctx.operator, &order.id).await.unwrap();
		assert_eq!(detail.items.len(), 1);
		assert_eq!(detail.items[0].work_type_ids.len(), 2);
	}

	#[tokio::test]
	async fn test_create_rejects_mid_pipeline_status() {
		let ctx = setup().await;
		let err = ctx
			.ops
			.orders()
			.create(
				&ctx.operator,
				NewOrder {
					title: "bad".into(),
					comment: None,
					deadline_at: None,
					promoter_id: Some(ctx.promoter.user_id.clone()),
					status: OrderStatus::InProgress,
					items: vec![],
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Validation(_)));
	}

	#[tokio::test]
	async fn test_create_rejects_foreign_address() {
		let ctx = setup().await;
		let err = ctx
			.ops
			.orders()
			.create(
				&ctx.operator,
				NewOrder {
					title: "bad".into(),
					comment: None,
					deadline_at: None,
					promoter_id: Some(ctx.promoter.user_id.clone()),
					status: OrderStatus::Draft,
					items: vec![NewOrderItem {
						address_id: "missing-address".into(),
						comment: None,
						work_type_ids: vec![ctx.wash_windows_id.clone()],
					}],
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Validation(_)));
	}

	#[tokio::test]
	async fn test_same_status_request_is_a_noop() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;

		let status = ctx
			.ops
			.orders()
			.set_status(&ctx.operator, &order.id, OrderStatus::Assigned)
			.await
			.unwrap();
		assert_eq!(status, OrderStatus::Assigned);

		// The no-op path never runs recalculation, so no payout appears
		let payout = ctx.ops.payouts().find_by_order(&order.id).await.unwrap();
		assert!(payout.is_none());
	}

	#[tokio::test]
	async fn test_illegal_transition_is_rejected() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;

		let err = ctx
			.ops
			.orders()
			.set_status(&ctx.operator, &order.id, OrderStatus::Payment)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::InvalidTransition { .. }));
	}

	#[tokio::test]
	async fn test_promoter_cannot_use_operator_transitions() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;

		// Promoter walks their own work forward
		ctx.ops
			.orders()
			.set_status(&ctx.promoter, &order.id, OrderStatus::InProgress)
			.await
			.unwrap();
		ctx.ops
			.orders()
			.set_status(&ctx.promoter, &order.id, OrderStatus::Review)
			.await
			.unwrap();

		// Review -> Payment is operator-legal but promoter-forbidden
		let err = ctx
			.ops
			.orders()
			.set_status(&ctx.promoter, &order.id, OrderStatus::Payment)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Forbidden(_)));

		// A backward step is equally out of reach for the promoter
		let err = ctx
			.ops
			.orders()
			.set_status(&ctx.promoter, &order.id, OrderStatus::InProgress)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Forbidden(_)));
	}

	#[tokio::test]
	async fn test_foreign_promoter_is_denied_before_validity() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		let stranger = crate::testutil::TestContext::promoter_identity(&ctx, "stranger");

		// Assigned -> InProgress would be legal for the assigned promoter;
		// the ownership gate fires first
		let err = ctx
			.ops
			.orders()
			.set_status(&stranger, &order.id, OrderStatus::InProgress)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Forbidden(_)));
	}

	#[tokio::test]
	async fn test_status_drives_payout_status() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;
		let item_id = ctx.first_item_id(&order).await;
		let photo_id = ctx
			.upload_photo(&item_id, &ctx.wash_windows_id, "hash-a")
			.await;
		ctx.review_photo(&photo_id, ReviewDecision::Accepted).await;

		for (target, expected) in [
			(OrderStatus::InProgress, PayoutStatus::Review),
			(OrderStatus::Review, PayoutStatus::Review),
			(OrderStatus::Payment, PayoutStatus::ToPay),
			(OrderStatus::Completed, PayoutStatus::Paid),
		] {
			ctx.ops
				.orders()
				.set_status(&ctx.operator, &order.id, target)
				.await
				.unwrap();
			let payout = ctx
				.ops
				.payouts()
				.find_by_order(&order.id)
				.await
				.unwrap()
				.expect("payout exists after transition");
			assert_eq!(payout.status, expected, "after transition to {target}");
			assert_eq!(payout.amount_final, dec("10.00"));
		}
	}

	#[tokio::test]
	async fn test_promoter_listing_is_scoped() {
		let ctx = setup().await;
		let order = ctx.create_assigned_order().await;

		let visible = ctx.ops.orders().list(&ctx.promoter).await.unwrap();
		assert_eq!(visible.len(), 1);
		assert_eq!(visible[0].id, order.id);

		let stranger = crate::testutil::TestContext::promoter_identity(&ctx, "stranger");
		assert!(ctx.ops.orders().list(&stranger).await.unwrap().is_empty());
	}
}
