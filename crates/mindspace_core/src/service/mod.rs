//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate graph mutations with snapshot persistence.
//! - Keep UI layers decoupled from storage and hydration details.

pub mod space_service;
