//! Core types for atconf
//!
//! This module holds the error type used across the crate and the user-facing
//! error reporting built on it.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`ConfigureError`] - Enumerated error type covering all atconf failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! # Examples
//!
//! ```rust,no_run
//! use atconf::core::{ConfigureError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(ConfigureError::UnknownVariable { name: "PREFIX".into() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     user_friendly_error(e).display();
//! }
//! ```

pub mod error;

pub use error::{ConfigureError, ErrorContext, user_friendly_error};

/// Result alias used by the library layers.
pub type Result<T, E = ConfigureError> = std::result::Result<T, E>;
