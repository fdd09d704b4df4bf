//! Core business logic for the museum catalog.
//!
//! Services sit between the HTTP layer and the repositories: they validate
//! input, assign exhibit identities, render QR labels, manage media files
//! and localize exhibit content for visitors.

pub mod services;

pub use services::*;
