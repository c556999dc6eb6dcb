//! Utility helpers shared across atconf.
//!
//! - [`fs`] - atomic file writes and directory creation

pub mod fs;
