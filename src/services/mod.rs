//! External collaborator services
//!
//! This module contains the persistence layer for the schedule list.

pub mod store;

// Re-export main types
pub use store::JsonFileStore;
