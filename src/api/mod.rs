//! QR code generator WASM API
//!
//! JavaScript-facing surface of the crate. Everything here needs a browser;
//! the logic it drives lives in the platform-independent modules.
//!
//! - `helpers`: console logging macros, serde conversions, error mapping
//! - `engine`: binding to the `QRCodeStyling` engine
//! - `observer`: MutationObserver on the mount surface
//! - `app`: the session singleton and the exported functions

pub mod helpers;
pub mod engine;
pub mod observer;
pub mod app;

pub use app::*;
