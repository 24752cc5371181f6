//! Render bridge
//!
//! Translates `StyleOptions` into the rendering engine's update payload and
//! pushes it through the `QrEngine` seam. The engine itself lives on the
//! JavaScript side (see `crate::api::engine`).
//!
//! - `sizing`: top-level SVG sizing applied to engine output

pub mod sizing;

pub use sizing::{is_top_level_svg, make_responsive, normalize_inserted, SurfaceElement};

use serde::Serialize;

use crate::models::{
    CornerDotType, CornerSquareType, DotType, ErrorCorrectionLevel, ShapeType, StyleOptions,
};

/// `{errorCorrectionLevel}`
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeOptions {
    pub error_correction_level: ErrorCorrectionLevel,
}

/// `{type, color}` for one element family
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ShapeStyle<T> {
    #[serde(rename = "type")]
    pub kind: T,
    pub color: String,
}

/// `{margin}` in engine units
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ImageOptions {
    pub margin: f64,
}

/// Full options object for `QRCodeStyling.update`
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnginePayload {
    pub qr_options: QrCodeOptions,
    pub shape: ShapeType,
    pub width: u32,
    pub height: u32,
    pub image: String,
    pub dots_options: ShapeStyle<DotType>,
    pub corners_square_options: ShapeStyle<CornerSquareType>,
    pub corners_dot_options: ShapeStyle<CornerDotType>,
    pub image_options: ImageOptions,
}

impl EnginePayload {
    /// Map a style value onto the engine's option shape.
    ///
    /// Size and margin are clamped to the widget ranges first. The logo is
    /// blanked when the brand is removed and the margin goes from UI units
    /// to engine units (divided by 10).
    pub fn from_options(options: &StyleOptions) -> EnginePayload {
        let options = options.clamped();
        EnginePayload {
            qr_options: QrCodeOptions {
                error_correction_level: options.error_correction_level,
            },
            shape: options.shape,
            width: options.size,
            height: options.size,
            image: options.effective_image().to_string(),
            dots_options: ShapeStyle {
                kind: options.main_shape,
                color: options.shape_color.clone(),
            },
            corners_square_options: ShapeStyle {
                kind: options.square_shape,
                color: options.square_color.clone(),
            },
            corners_dot_options: ShapeStyle {
                kind: options.corners_dot_shape,
                color: options.corners_dot_color.clone(),
            },
            image_options: ImageOptions {
                margin: f64::from(options.image_margin) / 10.0,
            },
        }
    }
}

/// `{data}` update sent when the encoded payload changes
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DataPayload {
    pub data: String,
}

/// The rendering engine as seen from Rust
pub trait QrEngine {
    /// Restyle the current symbol
    fn update_options(&mut self, payload: &EnginePayload);
    /// Re-encode with new content
    fn update_data(&mut self, payload: &DataPayload);
}

/// Forwards option and data changes to an engine, skipping repeats
pub struct RenderBridge<E: QrEngine> {
    engine: E,
    last_payload: Option<EnginePayload>,
    last_data: Option<String>,
}

impl<E: QrEngine> RenderBridge<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            last_payload: None,
            last_data: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Push the options; returns false if the engine already has them
    pub fn apply(&mut self, options: &StyleOptions) -> bool {
        let payload = EnginePayload::from_options(options);
        if self.last_payload.as_ref() == Some(&payload) {
            return false;
        }
        log::debug!(
            "Render update: {}px, dots {:?}, logo {}",
            payload.width,
            payload.dots_options.kind,
            if payload.image.is_empty() { "hidden" } else { "shown" }
        );
        self.engine.update_options(&payload);
        self.last_payload = Some(payload);
        true
    }

    /// Push encoded content; returns false if unchanged
    pub fn set_data(&mut self, data: &str) -> bool {
        if self.last_data.as_deref() == Some(data) {
            return false;
        }
        self.engine.update_data(&DataPayload {
            data: data.to_string(),
        });
        self.last_data = Some(data.to_string());
        true
    }

    /// Last payload sent, if any
    pub fn last_payload(&self) -> Option<&EnginePayload> {
        self.last_payload.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BRAND;

    #[derive(Default)]
    struct RecordingEngine {
        updates: Vec<EnginePayload>,
        data: Vec<String>,
    }

    impl QrEngine for RecordingEngine {
        fn update_options(&mut self, payload: &EnginePayload) {
            self.updates.push(payload.clone());
        }

        fn update_data(&mut self, payload: &DataPayload) {
            self.data.push(payload.data.clone());
        }
    }

    #[test]
    fn test_payload_from_rich_default() {
        let payload = EnginePayload::from_options(&StyleOptions::rich_default());
        assert_eq!(payload.width, 1000);
        assert_eq!(payload.height, 1000);
        assert_eq!(payload.image, DEFAULT_BRAND);
        assert_eq!(payload.image_options.margin, 1.0);
        assert_eq!(payload.dots_options.kind, DotType::Diamond);
        assert_eq!(payload.corners_dot_options.color, "#FFF200");
    }

    #[test]
    fn test_removed_brand_blanks_image() {
        let payload = EnginePayload::from_options(&StyleOptions::basic());
        assert_eq!(payload.image, "");
    }

    #[test]
    fn test_payload_json_shape() {
        let json = serde_json::to_value(EnginePayload::from_options(&StyleOptions::rich_default())).unwrap();
        assert_eq!(json["qrOptions"]["errorCorrectionLevel"], "H");
        assert_eq!(json["dotsOptions"]["type"], "diamond");
        assert_eq!(json["cornersSquareOptions"]["type"], "square");
        assert_eq!(json["cornersDotOptions"]["type"], "dot");
        assert_eq!(json["imageOptions"]["margin"], 1.0);
        assert_eq!(json["shape"], "square");
    }

    #[test]
    fn test_out_of_range_values_are_clamped_for_the_engine() {
        let mut options = StyleOptions::rich_default();
        options.size = 4000;
        options.image_margin = 300;
        let payload = EnginePayload::from_options(&options);
        assert_eq!(payload.width, 1500);
        assert_eq!(payload.image_options.margin, 10.0);
    }

    #[test]
    fn test_bridge_skips_identical_updates() {
        let mut bridge = RenderBridge::new(RecordingEngine::default());
        assert!(bridge.apply(&StyleOptions::rich_default()));
        assert!(!bridge.apply(&StyleOptions::rich_default()));
        assert!(bridge.apply(&StyleOptions::basic()));
        assert_eq!(bridge.engine().updates.len(), 2);

        assert!(bridge.set_data("https://example.com"));
        assert!(!bridge.set_data("https://example.com"));
        assert_eq!(bridge.engine().data, vec!["https://example.com".to_string()]);
    }
}
