//! HTTP middleware components.
//!
//! Pieces that sit between the transport and the services:
//! - Caller credential extraction (access token, admin secret)
//! - CORS for browser clients

/// Credential header extraction
pub mod auth;
/// Cross-origin resource sharing policy
pub mod cors;
