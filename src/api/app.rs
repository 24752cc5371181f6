//! Session state and the exported JavaScript API
//!
//! One `QrApp` per page, created by `start(mountId)`. JS handles are not
//! `Send`, so the instance lives in a `thread_local!` slot rather than a
//! `Mutex` static.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::api::engine::BrowserEngine;
use crate::api::helpers::{deserialize, field_input, js_error, serialize};
use crate::api::observer::SurfaceObserver;
use crate::config::{copyright_years, EMBEDDED_LOGOS, SITE};
use crate::export::{ExportFormat, ExportPipeline};
use crate::models::OptionsPatch;
use crate::payload::QrPayload;
use crate::render::{EnginePayload, QrEngine, RenderBridge};
use crate::store::{OptionsStore, SessionStorage, UploadMeta};
use crate::ui::{PanelAction, PasswordAction, TabAction, TabKind, UiState};
use crate::{wasm_info, wasm_warn};

/// Startup and lifecycle failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Mount element '#{0}' not found")]
    MissingMount(String),

    #[error("No browser document available")]
    NoDocument,

    #[error("QR code generator is not started")]
    NotStarted,

    #[error("QR code generator is already running; call stop() first")]
    AlreadyStarted,

    #[error("Rendering engine setup failed: {0}")]
    Engine(String),
}

impl From<AppError> for JsValue {
    fn from(error: AppError) -> Self {
        js_error("App", error)
    }
}

/// Everything a page session owns
pub struct QrApp {
    store: OptionsStore<SessionStorage>,
    bridge: Rc<RefCell<RenderBridge<BrowserEngine>>>,
    exporter: ExportPipeline<BrowserEngine>,
    ui: UiState,
    mount: web_sys::Element,
    observer: SurfaceObserver,
}

thread_local! {
    static APP: RefCell<Option<QrApp>> = RefCell::new(None);
}

fn with_app<R>(f: impl FnOnce(&mut QrApp) -> Result<R, JsValue>) -> Result<R, JsValue> {
    APP.with(|slot| match slot.borrow_mut().as_mut() {
        Some(app) => f(app),
        None => Err(AppError::NotStarted.into()),
    })
}

impl QrApp {
    fn new(mount_id: &str) -> Result<QrApp, AppError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(AppError::NoDocument)?;
        let mount = document
            .get_element_by_id(mount_id)
            .ok_or_else(|| AppError::MissingMount(mount_id.to_string()))?;

        let mut store = OptionsStore::new(SessionStorage::detect());
        let observer = SurfaceObserver::attach(&mount)
            .map_err(|e| AppError::Engine(format!("surface observer: {:?}", e)))?;
        let engine = BrowserEngine::create(store.options(), &mount)
            .map_err(|e| AppError::Engine(format!("{:?}", e)))?;

        let bridge = Rc::new(RefCell::new(RenderBridge::new(engine.clone())));
        bridge.borrow_mut().apply(store.options());
        let subscriber = Rc::clone(&bridge);
        store.subscribe(move |options| {
            subscriber.borrow_mut().apply(options);
        });

        Ok(QrApp {
            store,
            bridge,
            exporter: ExportPipeline::new(engine),
            ui: UiState::default(),
            mount,
            observer,
        })
    }

    /// Stop watching the surface and remove the rendered code from it
    fn teardown(self) {
        self.observer.disconnect();
        self.mount.set_inner_html("");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create the session and mount the engine into `#mountId`
#[wasm_bindgen(js_name = start)]
pub fn start(mount_id: &str) -> Result<(), JsValue> {
    if APP.with(|slot| slot.borrow().is_some()) {
        return Err(AppError::AlreadyStarted.into());
    }
    let app = QrApp::new(mount_id)?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    wasm_info!("QR code generator started in #{}", mount_id);
    Ok(())
}

/// Tear the session down and empty the mount element
#[wasm_bindgen(js_name = stop)]
pub fn stop() {
    let previous = APP.with(|slot| slot.borrow_mut().take());
    if let Some(app) = previous {
        app.teardown();
        wasm_info!("QR code generator stopped");
    }
}

// ============================================================================
// Style options
// ============================================================================

#[wasm_bindgen(js_name = getOptions)]
pub fn get_options() -> Result<JsValue, JsValue> {
    with_app(|app| serialize(app.store.options(), "Options"))
}

/// Merge a partial options object, e.g. `{ mainShape: "dots" }`
#[wasm_bindgen(js_name = updateOptions)]
pub fn update_options(patch: JsValue) -> Result<JsValue, JsValue> {
    let patch: OptionsPatch = deserialize(patch, "Invalid options patch")?;
    with_app(|app| {
        app.store.apply_patch(&patch);
        serialize(app.store.options(), "Options")
    })
}

/// Form control change: `name` attribute plus the control's value or
/// checked state
#[wasm_bindgen(js_name = applyField)]
pub fn apply_field(name: &str, value: JsValue) -> Result<JsValue, JsValue> {
    with_app(|app| {
        match field_input(&value) {
            Some(input) => app.store.apply_field(name, &input),
            None => wasm_warn!("Ignoring '{}': unsupported value {:?}", name, value),
        }
        serialize(app.store.options(), "Options")
    })
}

#[wasm_bindgen(js_name = reset)]
pub fn reset() -> Result<JsValue, JsValue> {
    with_app(|app| {
        app.store.reset();
        serialize(app.store.options(), "Options")
    })
}

#[wasm_bindgen(js_name = setBasic)]
pub fn set_basic() -> Result<JsValue, JsValue> {
    with_app(|app| {
        app.store.set_basic();
        serialize(app.store.options(), "Options")
    })
}

#[wasm_bindgen(js_name = save)]
pub fn save() -> Result<(), JsValue> {
    with_app(|app| app.store.save().map_err(|e| js_error("Save", e)))
}

#[wasm_bindgen(js_name = loadSaved)]
pub fn load_saved() -> Result<JsValue, JsValue> {
    with_app(|app| {
        app.store.load_saved();
        serialize(app.store.options(), "Options")
    })
}

/// Use a preset logo (or any image URI)
#[wasm_bindgen(js_name = setImage)]
pub fn set_image(path: &str) -> Result<(), JsValue> {
    with_app(|app| {
        app.store.set_image(path);
        Ok(())
    })
}

#[wasm_bindgen(js_name = resetImage)]
pub fn reset_image() -> Result<(), JsValue> {
    with_app(|app| {
        app.store.reset_image();
        Ok(())
    })
}

// ============================================================================
// Logo upload
// ============================================================================

/// Validate and decode a user-selected logo.
///
/// Returns false when the file is rejected; the reason is then available
/// from `getUploadError`. Decoding finishes asynchronously.
#[wasm_bindgen(js_name = uploadLogo)]
pub fn upload_logo(file: web_sys::File) -> Result<bool, JsValue> {
    let meta = UploadMeta {
        name: file.name(),
        mime: file.type_(),
        size: file.size().max(0.0) as u64,
    };
    let accepted = with_app(|app| Ok(app.store.begin_upload(&meta).is_ok()))?;
    if !accepted {
        return Ok(false);
    }

    let reader = web_sys::FileReader::new()?;
    let finished = reader.clone();
    let on_load_end = Closure::once(move |_event: web_sys::ProgressEvent| {
        let decoded = finished.result().ok().and_then(|value| value.as_string());
        let outcome = with_app(|app| {
            match decoded {
                Some(data_uri) => app.store.finish_upload(data_uri),
                None => app.store.fail_upload("could not read the file"),
            }
            Ok(())
        });
        if outcome.is_err() {
            wasm_warn!("Upload finished after the session was stopped");
        }
    });
    reader.set_onloadend(Some(on_load_end.as_ref().unchecked_ref()));
    on_load_end.forget();
    reader.read_as_data_url(&file)?;
    Ok(true)
}

#[wasm_bindgen(js_name = getUploadError)]
pub fn get_upload_error() -> Result<Option<String>, JsValue> {
    with_app(|app| Ok(app.store.upload_error().map(str::to_string)))
}

// ============================================================================
// Payload
// ============================================================================

/// Encode a submitted form and send it to the engine; returns the encoding.
/// Event dates may be RFC 3339 strings or raw `datetime-local` input values.
#[wasm_bindgen(js_name = setData)]
pub fn set_data(payload: JsValue) -> Result<String, JsValue> {
    let payload: QrPayload = deserialize(payload, "Invalid payload")?;
    let data = payload.encode().map_err(|e| js_error("Payload", e))?;
    with_app(|app| {
        app.bridge.borrow_mut().set_data(&data);
        Ok(data)
    })
}

/// Initial form values for the tab at `index`
#[wasm_bindgen(js_name = initialPayload)]
pub fn initial_payload(index: usize) -> Result<JsValue, JsValue> {
    let tab = TabKind::from_index(index)
        .ok_or_else(|| js_error("Payload", format!("no tab at index {}", index)))?;
    serialize(&QrPayload::initial(tab), "Payload")
}

// ============================================================================
// Export
// ============================================================================

/// Download `QRCode.<extension>`; `svg` goes through the vector pipeline
#[wasm_bindgen(js_name = exportImage)]
pub fn export_image(extension: &str, size: u32) -> Result<(), JsValue> {
    let format = ExportFormat::from_extension(extension).map_err(|e| js_error("Export", e))?;
    if format.is_vector() {
        export_vector(size)
    } else {
        export_raster(extension, size)
    }
}

/// Rasterized download through the engine (`png`, `jpg`, `jpeg`, `webp`)
#[wasm_bindgen(js_name = exportRaster)]
pub fn export_raster(extension: &str, size: u32) -> Result<(), JsValue> {
    let format = ExportFormat::from_extension(extension).map_err(|e| js_error("Export", e))?;
    with_app(|app| {
        app.exporter
            .export_raster(format, size)
            .map_err(|e| js_error("Export", e))
    })
}

/// Serialize at `size`, flatten and download `QRCode.svg`
#[wasm_bindgen(js_name = exportVector)]
pub fn export_vector(size: u32) -> Result<(), JsValue> {
    let engine = with_app(|app| Ok(app.exporter.target().clone()))?;
    engine.resize(size)?;
    engine.serialize_markup(move |markup| {
        let outcome = with_app(|app| {
            let exported = markup.and_then(|markup| app.exporter.export_vector(&markup));
            // Back to the on-screen size
            let payload = EnginePayload::from_options(app.store.options());
            app.exporter.target_mut().update_options(&payload);
            exported.map(|_| ()).map_err(|e| js_error("Export", e))
        });
        if let Err(e) = outcome {
            wasm_warn!("SVG export did not complete: {:?}", e);
        }
    });
    Ok(())
}

// ============================================================================
// UI state
// ============================================================================

#[wasm_bindgen(js_name = getUiState)]
pub fn get_ui_state() -> Result<JsValue, JsValue> {
    with_app(|app| serialize(&app.ui, "UI state"))
}

/// `"toggle"` or `"close"`
#[wasm_bindgen(js_name = dispatchPanel)]
pub fn dispatch_panel(action: JsValue) -> Result<JsValue, JsValue> {
    let action: PanelAction = deserialize(action, "Invalid panel action")?;
    with_app(|app| {
        app.ui.panel = app.ui.panel.reduce(action);
        serialize(&app.ui, "UI state")
    })
}

#[wasm_bindgen(js_name = selectTab)]
pub fn select_tab(index: usize) -> Result<JsValue, JsValue> {
    with_app(|app| {
        app.ui.tabs = app.ui.tabs.reduce(TabAction::Selected(index));
        serialize(&app.ui, "UI state")
    })
}

#[wasm_bindgen(js_name = togglePasswordVisible)]
pub fn toggle_password_visible() -> Result<JsValue, JsValue> {
    with_app(|app| {
        app.ui.password = app.ui.password.reduce(PasswordAction::ToggleVisible);
        serialize(&app.ui, "UI state")
    })
}

// ============================================================================
// Branding
// ============================================================================

#[wasm_bindgen(js_name = embeddedLogos)]
pub fn embedded_logos() -> Result<JsValue, JsValue> {
    serialize(&EMBEDDED_LOGOS, "Logos")
}

#[wasm_bindgen(js_name = siteInfo)]
pub fn site_info() -> Result<JsValue, JsValue> {
    serialize(&SITE, "Site")
}

/// Footer copyright, e.g. "2024-2026"
#[wasm_bindgen(js_name = copyright)]
pub fn copyright() -> String {
    let year = js_sys::Date::new_0().get_utc_full_year() as i32;
    copyright_years(year)
}
