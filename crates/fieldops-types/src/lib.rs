//! Common types for the fieldops backend.
//!
//! This crate defines the core data types shared by every fieldops
//! component: the tenant-scoped domain entities, actor identity, storage
//! namespaces, and the configuration validation framework.

/// Workspace catalog types: addresses and priced work types.
pub mod catalog;
/// Actor identity, roles, and user records.
pub mod identity;
/// Work-order types including the order status enum.
pub mod order;
/// Derived payout records and the payout status mapping.
pub mod payout;
/// Photo evidence records and review payloads.
pub mod photo;
/// Storage namespaces for persistent collections.
pub mod storage;
/// Configuration validation types for backend settings.
pub mod validation;

// Re-export all types for convenient access
pub use catalog::*;
pub use identity::*;
pub use order::*;
pub use payout::*;
pub use photo::*;
pub use storage::*;
pub use validation::*;
