//! Photo evidence service.
//!
//! Records uploads and operator reviews. The uploaded bytes themselves are
//! persisted by the file-storage collaborator; this service validates the
//! declared upload against the configured policy, checks the linkage to
//! the order item and work type, enforces the workspace-wide content-hash
//! dedup, and keeps the payout in sync with every mutation.

use crate::error::CoreError;
use crate::guards;
use crate::payout::PayoutEngine;
use crate::state::OrderStateMachine;
use chrono::Utc;
use fieldops_config::UploadConfig;
use fieldops_storage::StorageService;
use fieldops_types::{
	Identity, OrderItem, Photo, PhotoReview, PhotoStatus, PhotoUpload, ReviewDecision, Role,
	StorageKey, WorkType,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Service recording photo uploads and reviews.
pub struct PhotoService {
	storage: Arc<StorageService>,
	state_machine: Arc<OrderStateMachine>,
	payouts: Arc<PayoutEngine>,
	upload_policy: UploadConfig,
}

impl PhotoService {
	pub fn new(
		storage: Arc<StorageService>,
		state_machine: Arc<OrderStateMachine>,
		payouts: Arc<PayoutEngine>,
		upload_policy: UploadConfig,
	) -> Self {
		Self {
			storage,
			state_machine,
			payouts,
			upload_policy,
		}
	}

	/// Records an uploaded photo as pending evidence. Promoter-only.
	///
	/// The promoter must be assigned to the order the item belongs to, the
	/// work type must be one the item declares, and the content hash must
	/// be unused within the workspace. A successful record immediately
	/// recalculates the order's payout; if that fails the photo record is
	/// rolled back with it.
	#[instrument(skip_all, fields(order_item_id = %upload.order_item_id))]
	pub async fn record_upload(
		&self,
		actor: &Identity,
		upload: PhotoUpload,
	) -> Result<Photo, CoreError> {
		guards::require_role(actor, Role::Promoter, "only promoters upload photos")?;

		if !self.upload_policy.allows_mime_type(&upload.content_type) {
			return Err(CoreError::Validation("unsupported file type".into()));
		}
		if upload.size_bytes == 0 {
			return Err(CoreError::Validation("empty file".into()));
		}
		if upload.size_bytes > self.upload_policy.max_size_bytes() {
			return Err(CoreError::Validation("file is too large".into()));
		}

		let item: OrderItem = self
			.storage
			.retrieve(StorageKey::OrderItems.as_str(), &upload.order_item_id)
			.await
			.map_err(|e| CoreError::from_lookup(e, "order item"))?;

		let order = self.state_machine.get_order(&item.order_id).await?;
		guards::ensure_order_visible(&order, actor)?;

		let work_type: WorkType = match self
			.storage
			.retrieve(StorageKey::WorkTypes.as_str(), &upload.work_type_id)
			.await
		{
			Ok(work_type) => work_type,
			Err(fieldops_storage::StorageError::NotFound) => {
				return Err(CoreError::Validation("invalid work_type_id".into()))
			},
			Err(e) => return Err(e.into()),
		};
		if work_type.workspace_id != actor.workspace_id {
			return Err(CoreError::Validation("invalid work_type_id".into()));
		}
		if !item.work_type_ids.contains(&upload.work_type_id) {
			return Err(CoreError::Validation(
				"work_type is not assigned to the order item".into(),
			));
		}

		// Tenant-wide dedup: the same file content may only be submitted
		// once per workspace, across all orders
		let photos: Vec<Photo> = self
			.storage
			.retrieve_all(StorageKey::Photos.as_str())
			.await?;
		if photos.iter().any(|p| {
			p.workspace_id == actor.workspace_id && p.content_hash == upload.content_hash
		}) {
			return Err(CoreError::Validation("duplicate file".into()));
		}

		let photo = Photo {
			id: Uuid::new_v4().to_string(),
			workspace_id: actor.workspace_id.clone(),
			order_id: order.id.clone(),
			order_item_id: item.id.clone(),
			work_type_id: upload.work_type_id,
			uploader_id: actor.user_id.clone(),
			content_hash: upload.content_hash,
			uploaded_at: Utc::now(),
			geo: upload.geo,
			status: PhotoStatus::Pending,
			reject_reason: None,
		};
		self.storage
			.store(StorageKey::Photos.as_str(), &photo.id, &photo)
			.await?;

		// New evidence changes the preliminary amount right away
		if let Err(err) = self.payouts.recalculate(&order).await {
			self.storage
				.remove(StorageKey::Photos.as_str(), &photo.id)
				.await?;
			return Err(err);
		}

		tracing::debug!(photo_id = %photo.id, order_id = %order.id, "recorded photo upload");
		Ok(photo)
	}

	/// Applies an operator review decision to a photo.
	///
	/// Sets the photo accepted or rejected and recalculates the payout of
	/// the affected order; a recalculation failure restores the previous
	/// review state.
	#[instrument(skip_all, fields(photo_id = %photo_id))]
	pub async fn review(
		&self,
		actor: &Identity,
		photo_id: &str,
		review: PhotoReview,
	) -> Result<Photo, CoreError> {
		guards::require_role(actor, Role::Operator, "only operators review photos")?;

		let mut photo: Photo = self
			.storage
			.retrieve(StorageKey::Photos.as_str(), photo_id)
			.await
			.map_err(|e| CoreError::from_lookup(e, "photo"))?;
		if photo.workspace_id != actor.workspace_id {
			return Err(CoreError::NotFound("photo"));
		}

		let previous = photo.clone();
		photo.status = match review.decision {
			ReviewDecision::Accepted => PhotoStatus::Accepted,
			ReviewDecision::Rejected => PhotoStatus::Rejected,
		};
		photo.reject_reason = review.reject_reason;

		let order = self.state_machine.get_order(&photo.order_id).await?;

		self.storage
			.update(StorageKey::Photos.as_str(), photo_id, &photo)
			.await?;

		if let Err(err) = self.payouts.recalculate(&order).await {
			self.storage
				.update(StorageKey::Photos.as_str(), photo_id, &previous)
				.await?;
			return Err(err);
		}

		tracing::debug!(status = ?photo.status, "reviewed photo");
		Ok(photo)
	}

	/// Lists the photos of an order, applying the uniform access gate.
	pub async fn list_by_order(
		&self,
		actor: &Identity,
		order_id: &str,
	) -> Result<Vec<Photo>, CoreError> {
		let order = self.state_machine.get_order(order_id).await?;
		guards::ensure_order_visible(&order, actor)?;

		let mut photos: Vec<Photo> = self
			.storage
			.retrieve_all(StorageKey::Photos.as_str())
			.await?;
		photos.retain(|photo| photo.order_id == order.id);
		photos.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
		Ok(photos)
	}
}
