//! QR Code Styler WASM Module
//!
//! Style options state, render bridge, payload encoders and SVG export for
//! the browser-based QR code generator. The rendering engine itself is the
//! JavaScript `QRCodeStyling` library, driven through `api`.

pub mod api;
pub mod config;
pub mod export;
pub mod models;
pub mod payload;
pub mod render;
pub mod store;
pub mod svg;
pub mod ui;

// Re-export commonly used types
pub use export::{ExportError, ExportFormat, ExportPipeline, ExportTarget};
pub use models::{FieldInput, OptionValue, OptionsPatch, StyleOptions};
pub use payload::{PayloadError, QrPayload};
pub use render::{EnginePayload, QrEngine, RenderBridge};
pub use store::{KeyValueStore, MemoryStorage, OptionsStore, StorageError, UploadError, UploadMeta};

use wasm_bindgen::prelude::*;

// Runs when the module is instantiated, before `start(mountId)`.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    let _ = console_log::init_with_level(log::Level::Debug)
        .map_err(|_| wasm_warn!("Logger was already initialized"));

    log::info!("QR Code Styler WASM module initialized");
}
