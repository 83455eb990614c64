//! Photo evidence types.
//!
//! Photos are the evidence records promoters upload against one
//! (order item, work type) pair. The byte storage of the uploaded file is
//! handled by an external collaborator; the core tracks the metadata
//! record and its review status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates attached to an uploaded photo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lng: f64,
}

/// Evidence record for one (order item, work type) combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
	/// Unique identifier for this photo.
	pub id: String,
	/// Workspace this photo belongs to.
	pub workspace_id: String,
	/// Order the photographed item belongs to. Denormalized back-reference
	/// for point lookups; the payout join still matches through item
	/// membership.
	pub order_id: String,
	/// Order item the photo documents.
	pub order_item_id: String,
	/// Work type the photo documents.
	pub work_type_id: String,
	/// Promoter who uploaded the photo.
	pub uploader_id: String,
	/// SHA-256 hex digest of the file content, unique per workspace.
	pub content_hash: String,
	/// Timestamp when the upload was recorded.
	pub uploaded_at: DateTime<Utc>,
	/// Coordinates captured at upload time, if available.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub geo: Option<GeoPoint>,
	/// Review status of the photo.
	pub status: PhotoStatus,
	/// Reason supplied by the reviewing operator on rejection.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reject_reason: Option<String>,
}

/// Review status of a photo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStatus {
	/// Uploaded, not yet reviewed.
	Pending,
	/// Accepted by an operator; counts toward the final payout amount.
	Accepted,
	/// Rejected by an operator.
	Rejected,
}

/// Input payload describing an upload whose bytes the file-storage
/// collaborator has already persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUpload {
	/// Order item the photo documents.
	pub order_item_id: String,
	/// Work type the photo documents.
	pub work_type_id: String,
	/// SHA-256 hex digest of the file content.
	pub content_hash: String,
	/// Declared MIME type of the uploaded file.
	pub content_type: String,
	/// Declared size of the uploaded file in bytes.
	pub size_bytes: u64,
	/// Coordinates captured at upload time, if available.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub geo: Option<GeoPoint>,
}

/// Outcome of an operator review action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
	Accepted,
	Rejected,
}

/// Input payload for reviewing a photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoReview {
	/// Accept or reject the photo.
	pub decision: ReviewDecision,
	/// Reason shown to the promoter on rejection.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reject_reason: Option<String>,
}
