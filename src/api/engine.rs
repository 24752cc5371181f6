//! Binding to the `QRCodeStyling` rendering engine
//!
//! The engine instance is created once in `start` and shared (by handle)
//! between the render bridge and the export pipeline.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::api::helpers::serialize;
use crate::config::SITE;
use crate::export::{ExportError, ExportTarget};
use crate::models::{ShapeType, StyleOptions};
use crate::render::{DataPayload, EnginePayload, QrEngine};

#[wasm_bindgen(module = "@liquid-js/qr-code-styling")]
extern "C" {
    #[wasm_bindgen(js_name = QRCodeStyling)]
    #[derive(Clone, Debug)]
    pub type QrCodeStyling;

    #[wasm_bindgen(constructor, js_class = "QRCodeStyling")]
    fn new(options: &JsValue) -> QrCodeStyling;

    #[wasm_bindgen(method, js_class = "QRCodeStyling")]
    fn update(this: &QrCodeStyling, options: &JsValue);

    #[wasm_bindgen(method, js_class = "QRCodeStyling")]
    fn append(this: &QrCodeStyling, container: &web_sys::Element);

    /// Resolves to the current SVG markup
    #[wasm_bindgen(method, js_class = "QRCodeStyling")]
    fn serialize(this: &QrCodeStyling) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = browserUtils, js_name = download)]
    fn browser_download(instance: &QrCodeStyling, options: &JsValue, size: &JsValue) -> js_sys::Promise;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitialImageOptions {
    cross_origin: &'static str,
    margin: f64,
    image_size: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitialOptions {
    data: &'static str,
    shape: ShapeType,
    image: String,
    image_options: InitialImageOptions,
}

#[derive(Serialize)]
struct DownloadOptions<'a> {
    extension: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct DownloadSize {
    width: u32,
    height: u32,
}

/// Handle on the page's single engine instance
#[derive(Clone, Debug)]
pub struct BrowserEngine {
    inner: QrCodeStyling,
}

impl BrowserEngine {
    /// Construct the engine with the site URL as data and mount it
    pub fn create(options: &StyleOptions, mount: &web_sys::Element) -> Result<BrowserEngine, JsValue> {
        let initial = InitialOptions {
            data: SITE.url,
            shape: options.shape,
            image: options.effective_image().to_string(),
            image_options: InitialImageOptions {
                cross_origin: "anonymous",
                margin: 1.0,
                image_size: 0.5,
            },
        };
        let inner = QrCodeStyling::new(&serialize(&initial, "Engine options")?);
        inner.append(mount);
        Ok(BrowserEngine { inner })
    }

    /// Resize without touching other options
    pub fn resize(&self, size: u32) -> Result<(), JsValue> {
        let value = serialize(&DownloadSize { width: size, height: size }, "Engine size")?;
        self.inner.update(&value);
        Ok(())
    }

    /// Ask for the current markup; `on_markup` gets the string or an error
    pub fn serialize_markup(&self, on_markup: impl FnOnce(Result<String, ExportError>) + 'static) {
        let on_markup = Rc::new(RefCell::new(Some(on_markup)));
        let on_error = Rc::clone(&on_markup);

        let resolved = Closure::once(move |value: JsValue| {
            if let Some(callback) = on_markup.borrow_mut().take() {
                callback(value.as_string().ok_or(ExportError::EmptyMarkup));
            }
        });
        let rejected = Closure::once(move |reason: JsValue| {
            if let Some(callback) = on_error.borrow_mut().take() {
                callback(Err(ExportError::Download(format!("{:?}", reason))));
            }
        });

        let _ = self.inner.serialize().then2(&resolved, &rejected);
        // Handed over to the JS side; only one of them will run
        resolved.forget();
        rejected.forget();
    }

    fn push(&self, value: &impl Serialize, context: &str) {
        match serialize(value, context) {
            Ok(js) => self.inner.update(&js),
            Err(_) => log::error!("{} could not be converted for the engine", context),
        }
    }
}

impl QrEngine for BrowserEngine {
    fn update_options(&mut self, payload: &EnginePayload) {
        self.push(payload, "Engine update");
    }

    fn update_data(&mut self, payload: &DataPayload) {
        self.push(payload, "Engine data");
    }
}

impl ExportTarget for BrowserEngine {
    fn download_raster(&mut self, extension: &str, name: &str, size: u32) -> Result<(), ExportError> {
        let options = serialize(&DownloadOptions { extension, name }, "Download options")
            .map_err(|e| ExportError::Download(format!("{:?}", e)))?;
        let size = serialize(&DownloadSize { width: size, height: size }, "Download size")
            .map_err(|e| ExportError::Download(format!("{:?}", e)))?;

        let failed = Closure::once(|reason: JsValue| {
            crate::wasm_error!("Raster download failed: {:?}", reason);
        });
        let _ = browser_download(&self.inner, &options, &size).catch(&failed);
        failed.forget();
        Ok(())
    }

    fn download_url(&mut self, url: &str, filename: &str) -> Result<(), ExportError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ExportError::Download("no document".to_string()))?;
        let anchor = document
            .create_element("a")
            .map_err(|e| ExportError::Download(format!("{:?}", e)))?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| ExportError::Download("<a> is not an anchor element".to_string()))?;
        anchor.set_href(url);
        anchor.set_download(filename);
        anchor.click();
        Ok(())
    }
}
