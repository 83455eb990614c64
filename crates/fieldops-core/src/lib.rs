//! Core services for the fieldops backend.
//!
//! This crate holds the order lifecycle state machine, the payout
//! recalculation engine, and the workspace services around them. The HTTP
//! routing, authentication, and file-storage collaborators sit outside;
//! they hand every operation a resolved [`fieldops_types::Identity`] and a
//! validated payload.

/// Batch payout recalculation.
pub mod backfill;
/// Workspace catalog: addresses and priced work types.
pub mod catalog;
/// Workspace user directory.
pub mod directory;
/// Error taxonomy shared by the core services.
pub mod error;
pub(crate) mod guards;
/// Order creation, reads, and lifecycle transitions.
pub mod orders;
/// Payout recalculation engine.
pub mod payout;
/// Photo evidence recording and review.
pub mod photos;
/// State machines for core entities.
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

pub use backfill::BackfillReport;
pub use error::CoreError;
pub use orders::{OrderDetail, OrderService};
pub use payout::PayoutEngine;
pub use photos::PhotoService;
pub use state::OrderStateMachine;

use catalog::CatalogService;
use directory::DirectoryService;
use fieldops_config::Config;
use fieldops_storage::StorageService;
use std::sync::Arc;

/// Top-level service bundle wiring the core components together.
pub struct OpsService {
	config: Config,
	storage: Arc<StorageService>,
	orders: OrderService,
	photos: PhotoService,
	payouts: Arc<PayoutEngine>,
	catalog: CatalogService,
	directory: DirectoryService,
}

impl OpsService {
	/// Builds the service bundle on top of a storage backend.
	pub fn new(config: Config, storage: Arc<StorageService>) -> Self {
		let state_machine = Arc::new(OrderStateMachine::new(storage.clone()));
		let payouts = Arc::new(PayoutEngine::new(storage.clone()));

		let orders = OrderService::new(storage.clone(), state_machine.clone(), payouts.clone());
		let photos = PhotoService::new(
			storage.clone(),
			state_machine,
			payouts.clone(),
			config.uploads.clone(),
		);
		let catalog = CatalogService::new(storage.clone());
		let directory = DirectoryService::new(storage.clone());

		Self {
			config,
			storage,
			orders,
			photos,
			payouts,
			catalog,
			directory,
		}
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Returns the order service.
	pub fn orders(&self) -> &OrderService {
		&self.orders
	}

	/// Returns the photo service.
	pub fn photos(&self) -> &PhotoService {
		&self.photos
	}

	/// Returns the payout engine.
	pub fn payouts(&self) -> &PayoutEngine {
		&self.payouts
	}

	/// Returns the catalog service.
	pub fn catalog(&self) -> &CatalogService {
		&self.catalog
	}

	/// Returns the user directory.
	pub fn directory(&self) -> &DirectoryService {
		&self.directory
	}
}
