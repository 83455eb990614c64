//! Shared test harness: an in-memory service seeded with one workspace,
//! an operator, a promoter, an address, and two priced work types.

use crate::OpsService;
use fieldops_config::{AuthConfig, Config, ServiceConfig, StorageConfig, UploadConfig};
use fieldops_storage::implementations::memory::MemoryStorage;
use fieldops_storage::StorageService;
use fieldops_types::{
	Identity, NewAddress, NewOrder, NewOrderItem, Order, OrderStatus, PhotoReview, PhotoUpload,
	ReviewDecision, Role,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) struct TestContext {
	pub ops: OpsService,
	pub operator: Identity,
	pub promoter: Identity,
	pub address_id: String,
	/// Priced at 10.00
	pub wash_windows_id: String,
	/// Priced at 7.50
	pub hang_poster_id: String,
}

pub(crate) fn dec(value: &str) -> Decimal {
	value.parse().expect("valid decimal literal")
}

fn test_config() -> Config {
	Config {
		service: ServiceConfig {
			id: "fieldops-test".into(),
		},
		storage: StorageConfig {
			primary: "memory".into(),
			implementations: HashMap::new(),
		},
		uploads: UploadConfig::default(),
		auth: AuthConfig {
			secret_key: "test-secret".into(),
			refresh_secret_key: "test-refresh-secret".into(),
			access_token_ttl_minutes: 15,
			refresh_token_ttl_days: 14,
		},
	}
}

pub(crate) async fn setup() -> TestContext {
	let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
	let ops = OpsService::new(test_config(), storage);

	let workspace_id = "ws-test";
	let operator_user = ops
		.directory()
		.add_user(workspace_id, Role::Operator, "Olga Operator")
		.await
		.unwrap();
	let promoter_user = ops
		.directory()
		.add_user(workspace_id, Role::Promoter, "Pavel Promoter")
		.await
		.unwrap();
	let operator = operator_user.identity();
	let promoter = promoter_user.identity();

	let address = ops
		.catalog()
		.add_address(
			&operator,
			NewAddress {
				district: None,
				street: "Main St".into(),
				building: "12".into(),
				lat: None,
				lng: None,
				comment: None,
			},
		)
		.await
		.unwrap();

	let wash_windows = ops
		.catalog()
		.add_work_type(&operator, "wash windows", dec("10.00"))
		.await
		.unwrap();
	let hang_poster = ops
		.catalog()
		.add_work_type(&operator, "hang poster", dec("7.50"))
		.await
		.unwrap();

	TestContext {
		ops,
		operator,
		promoter,
		address_id: address.id,
		wash_windows_id: wash_windows.id,
		hang_poster_id: hang_poster.id,
	}
}

impl TestContext {
	/// An identity posing as another promoter of the same workspace.
	pub fn promoter_identity(ctx: &TestContext, user_id: &str) -> Identity {
		Identity {
			user_id: user_id.to_string(),
			role: Role::Promoter,
			workspace_id: ctx.promoter.workspace_id.clone(),
		}
	}

	/// Creates an Assigned order with one item carrying both work types.
	pub async fn create_assigned_order(&self) -> Order {
		self.ops
			.orders()
			.create(
				&self.operator,
				NewOrder {
					title: "field run".into(),
					comment: None,
					deadline_at: None,
					promoter_id: Some(self.promoter.user_id.clone()),
					status: OrderStatus::Assigned,
					items: vec![NewOrderItem {
						address_id: self.address_id.clone(),
						comment: None,
						work_type_ids: vec![
							self.wash_windows_id.clone(),
							self.hang_poster_id.clone(),
						],
					}],
				},
			)
			.await
			.unwrap()
	}

	/// Creates an Assigned order whose item declares only "wash windows".
	pub async fn create_single_work_type_order(&self) -> Order {
		self.ops
			.orders()
			.create(
				&self.operator,
				NewOrder {
					title: "narrow run".into(),
					comment: None,
					deadline_at: None,
					promoter_id: Some(self.promoter.user_id.clone()),
					status: OrderStatus::Assigned,
					items: vec![NewOrderItem {
						address_id: self.address_id.clone(),
						comment: None,
						work_type_ids: vec![self.wash_windows_id.clone()],
					}],
				},
			)
			.await
			.unwrap()
	}

	/// Returns the first item id of an order.
	pub async fn first_item_id(&self, order: &Order) -> String {
		let detail = self
			.ops
			.orders()
			.get(&self.operator, &order.id)
			.await
			.unwrap();
		detail.items[0].id.clone()
	}

	/// Uploads a photo as the assigned promoter; returns the photo id.
	pub async fn upload_photo(&self, item_id: &str, work_type_id: &str, hash: &str) -> String {
		self.ops
			.photos()
			.record_upload(
				&self.promoter,
				PhotoUpload {
					order_item_id: item_id.to_string(),
					work_type_id: work_type_id.to_string(),
					content_hash: hash.to_string(),
					content_type: "image/jpeg".into(),
					size_bytes: 64 * 1024,
					geo: None,
				},
			)
			.await
			.unwrap()
			.id
	}

	/// Reviews a photo as the operator.
	pub async fn review_photo(&self, photo_id: &str, decision: ReviewDecision) {
		self.ops
			.photos()
			.review(
				&self.operator,
				photo_id,
				PhotoReview {
					decision,
					reject_reason: None,
				},
			)
			.await
			.unwrap();
	}
}
