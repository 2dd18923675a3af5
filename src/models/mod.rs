//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the JSON request/response bodies built around them.

/// Access token model and issuance API types
pub mod access_token;
/// License model and validation/admin API types
pub mod license;
