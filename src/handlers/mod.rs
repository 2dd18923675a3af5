//! HTTP request handlers (route handlers).
//!
//! Each handler is a thin adapter that:
//! 1. Extracts the JSON body and caller credential headers
//! 2. Calls the matching service
//! 3. Returns the JSON response (or an `AppError`)

/// License admin endpoints
pub mod admin;
/// Health check endpoint
pub mod health;
/// License validation endpoint
pub mod licenses;
/// Access token issuance endpoint
pub mod tokens;
