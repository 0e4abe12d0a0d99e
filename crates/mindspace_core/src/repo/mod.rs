//! Persistence layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define the durable snapshot document shape and its storage contract.
//! - Isolate SQL details from hydration and service orchestration.
//!
//! # Invariants
//! - Only the durable subset is ever persisted; selection, linking and undo
//!   state never reach storage.

pub mod snapshot_repo;
