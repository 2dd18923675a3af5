//! Business logic services.
//!
//! Services contain the core token and license logic separated from HTTP handlers.
//! Each one holds a handle to the shared store and nothing else; all state lives in the store.

pub mod admin_service;
pub mod license_service;
pub mod token_service;
pub mod token_sweeper;
