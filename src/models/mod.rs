//! Models module for the QR Code Styler
//!
//! This module contains the style configuration record and the
//! serde helpers used to read it back from storage.

pub mod options;
pub mod serde_helpers;

// Re-export commonly used types
pub use options::*;
