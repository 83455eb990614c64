//! State management for core entities.

pub mod order;

pub use order::OrderStateMachine;
