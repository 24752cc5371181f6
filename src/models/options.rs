//! Style options for the rendered QR code
//!
//! `StyleOptions` is the canonical configuration record. It is stored in UI
//! units (the logo margin in particular) and converted to the rendering
//! engine's units only in `crate::render`.

use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_BRAND, IMAGE_MARGIN_MAX, SIZE_MAX, SIZE_MIN, SIZE_STEP};
use crate::models::serde_helpers::{lenient_bool, lenient_opt_bool, lenient_opt_u32, lenient_u32};

/// Outer frame of the symbol
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeType {
    Square,
    Circle,
}

/// Shape of the data modules
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DotType {
    Square,
    SmallSquare,
    TinySquare,
    Dot,
    RandomDot,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
    VerticalLine,
    HorizontalLine,
    Diamond,
}

/// Shape of the three finder-pattern squares
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CornerSquareType {
    Square,
    Dot,
    ExtraRounded,
    Classy,
    Inpoint,
    Outpoint,
}

/// Shape of the dot inside each finder pattern
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CornerDotType {
    Square,
    Dot,
    Classy,
    ExtraRounded,
    Heart,
    Inpoint,
    Outpoint,
}

/// Error correction level forwarded to the symbol encoder
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    H,
}

impl DotType {
    pub const ALL: [DotType; 12] = [
        DotType::Square,
        DotType::SmallSquare,
        DotType::TinySquare,
        DotType::Dot,
        DotType::RandomDot,
        DotType::Rounded,
        DotType::ExtraRounded,
        DotType::Classy,
        DotType::ClassyRounded,
        DotType::VerticalLine,
        DotType::HorizontalLine,
        DotType::Diamond,
    ];
}

impl CornerSquareType {
    pub const ALL: [CornerSquareType; 6] = [
        CornerSquareType::Square,
        CornerSquareType::Dot,
        CornerSquareType::ExtraRounded,
        CornerSquareType::Classy,
        CornerSquareType::Inpoint,
        CornerSquareType::Outpoint,
    ];
}

impl CornerDotType {
    pub const ALL: [CornerDotType; 7] = [
        CornerDotType::Square,
        CornerDotType::Dot,
        CornerDotType::Classy,
        CornerDotType::ExtraRounded,
        CornerDotType::Heart,
        CornerDotType::Inpoint,
        CornerDotType::Outpoint,
    ];
}

/// Parse an engine string value ("extra-rounded", "H", ...) into one of the
/// option enums.
pub fn parse_variant<T: DeserializeOwned>(value: &str) -> Option<T> {
    T::deserialize(StrDeserializer::<ValueError>::new(value)).ok()
}

/// The complete style configuration
///
/// Missing fields in stored JSON fall back to the rich default.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    pub shape: ShapeType,

    /// Export width and height in pixels
    #[serde(deserialize_with = "lenient_u32")]
    pub size: u32,

    /// Hide the center logo regardless of `image`
    #[serde(deserialize_with = "lenient_bool")]
    pub remove_brand: bool,

    /// URI or data URI of the center logo
    pub image: String,

    /// Logo margin in UI units (0-100)
    #[serde(deserialize_with = "lenient_u32")]
    pub image_margin: u32,

    pub main_shape: DotType,
    pub shape_color: String,
    pub square_shape: CornerSquareType,
    pub square_color: String,
    pub corners_dot_shape: CornerDotType,
    pub corners_dot_color: String,
    pub error_correction_level: ErrorCorrectionLevel,
}

impl StyleOptions {
    /// Decorative default: diamond dots, brand colors, logo shown
    pub fn rich_default() -> Self {
        Self {
            shape: ShapeType::Square,
            size: 1000,
            remove_brand: false,
            image: DEFAULT_BRAND.to_string(),
            image_margin: 10,
            main_shape: DotType::Diamond,
            shape_color: "#8363AA".to_string(),
            square_shape: CornerSquareType::Square,
            square_color: "#00A79D".to_string(),
            corners_dot_shape: CornerDotType::Dot,
            corners_dot_color: "#FFF200".to_string(),
            error_correction_level: ErrorCorrectionLevel::H,
        }
    }

    /// Plain black-and-white square code without logo
    pub fn basic() -> Self {
        Self {
            shape: ShapeType::Square,
            size: 1000,
            remove_brand: true,
            image: DEFAULT_BRAND.to_string(),
            image_margin: 10,
            main_shape: DotType::Square,
            shape_color: "#000000".to_string(),
            square_shape: CornerSquareType::Square,
            square_color: "#000000".to_string(),
            corners_dot_shape: CornerDotType::Square,
            corners_dot_color: "#000000".to_string(),
            error_correction_level: ErrorCorrectionLevel::H,
        }
    }

    /// Merge a partial update into a copy of this value.
    ///
    /// Range constraints are not enforced here; the form widgets already
    /// constrain what a user can enter.
    pub fn normalize(&self, patch: &OptionsPatch) -> StyleOptions {
        let mut next = self.clone();
        if let Some(shape) = patch.shape {
            next.shape = shape;
        }
        if let Some(size) = patch.size {
            next.size = size;
        }
        if let Some(remove_brand) = patch.remove_brand {
            next.remove_brand = remove_brand;
        }
        if let Some(image) = &patch.image {
            next.image = image.clone();
        }
        if let Some(image_margin) = patch.image_margin {
            next.image_margin = image_margin;
        }
        if let Some(main_shape) = patch.main_shape {
            next.main_shape = main_shape;
        }
        if let Some(color) = &patch.shape_color {
            next.shape_color = color.clone();
        }
        if let Some(square_shape) = patch.square_shape {
            next.square_shape = square_shape;
        }
        if let Some(color) = &patch.square_color {
            next.square_color = color.clone();
        }
        if let Some(corners_dot_shape) = patch.corners_dot_shape {
            next.corners_dot_shape = corners_dot_shape;
        }
        if let Some(color) = &patch.corners_dot_color {
            next.corners_dot_color = color.clone();
        }
        if let Some(level) = patch.error_correction_level {
            next.error_correction_level = level;
        }
        next
    }

    /// Apply a raw form field change (`name` is the input's name attribute).
    ///
    /// Unknown fields and values that do not coerce are ignored.
    pub fn apply_field(&self, name: &str, input: &FieldInput) -> StyleOptions {
        match OptionsPatch::from_field(name, input) {
            Some(patch) => self.normalize(&patch),
            None => {
                log::warn!("Ignoring form field '{}' with value {:?}", name, input);
                self.clone()
            }
        }
    }

    /// Copy with size and margin pulled back into the widget ranges
    pub fn clamped(&self) -> StyleOptions {
        let mut next = self.clone();
        let size = self.size.clamp(SIZE_MIN, SIZE_MAX);
        next.size = (size + SIZE_STEP / 2) / SIZE_STEP * SIZE_STEP;
        next.image_margin = self.image_margin.min(IMAGE_MARGIN_MAX);
        next
    }

    /// Center logo as the engine should see it
    pub fn effective_image(&self) -> &str {
        if self.remove_brand {
            ""
        } else {
            &self.image
        }
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::rich_default()
    }
}

/// Raw value coming from a form control
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldInput {
    /// Text inputs, selects, ranges and color pickers
    Text(String),
    /// Checkboxes and switches
    Checked(bool),
}

/// Partial update: every `Some` field replaces the current one
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsPatch {
    pub shape: Option<ShapeType>,
    #[serde(deserialize_with = "lenient_opt_u32")]
    pub size: Option<u32>,
    #[serde(deserialize_with = "lenient_opt_bool")]
    pub remove_brand: Option<bool>,
    pub image: Option<String>,
    #[serde(deserialize_with = "lenient_opt_u32")]
    pub image_margin: Option<u32>,
    pub main_shape: Option<DotType>,
    pub shape_color: Option<String>,
    pub square_shape: Option<CornerSquareType>,
    pub square_color: Option<String>,
    pub corners_dot_shape: Option<CornerDotType>,
    pub corners_dot_color: Option<String>,
    pub error_correction_level: Option<ErrorCorrectionLevel>,
}

impl OptionsPatch {
    /// Build a single-field patch from a form control change.
    ///
    /// Checkbox-like fields accept `Checked` as well as "true"/"on" text;
    /// numeric fields must parse as a non-negative number.
    pub fn from_field(name: &str, input: &FieldInput) -> Option<OptionsPatch> {
        let mut patch = OptionsPatch::default();
        match name {
            "removeBrand" => patch.remove_brand = Some(coerce_bool(input)?),
            "size" => patch.size = Some(coerce_number(input)?),
            "imageMargin" => patch.image_margin = Some(coerce_number(input)?),
            "image" => patch.image = Some(text(input)?.to_string()),
            "shape" => patch.shape = Some(parse_variant(text(input)?)?),
            "mainShape" => patch.main_shape = Some(parse_variant(text(input)?)?),
            "squareShape" => patch.square_shape = Some(parse_variant(text(input)?)?),
            "cornersDotShape" => patch.corners_dot_shape = Some(parse_variant(text(input)?)?),
            "errorCorrectionLevel" => {
                patch.error_correction_level = Some(parse_variant(text(input)?)?)
            }
            "shapeColor" => patch.shape_color = Some(text(input)?.to_string()),
            "squareColor" => patch.square_color = Some(text(input)?.to_string()),
            "cornersDotColor" => patch.corners_dot_color = Some(text(input)?.to_string()),
            _ => return None,
        }
        Some(patch)
    }
}

/// A single typed field replacement, used by `OptionsStore::update`
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Shape(ShapeType),
    Size(u32),
    RemoveBrand(bool),
    Image(String),
    ImageMargin(u32),
    MainShape(DotType),
    ShapeColor(String),
    SquareShape(CornerSquareType),
    SquareColor(String),
    CornersDotShape(CornerDotType),
    CornersDotColor(String),
    ErrorCorrectionLevel(ErrorCorrectionLevel),
}

impl OptionValue {
    /// camelCase field name as used in JSON and in the form
    pub fn field_name(&self) -> &'static str {
        match self {
            OptionValue::Shape(_) => "shape",
            OptionValue::Size(_) => "size",
            OptionValue::RemoveBrand(_) => "removeBrand",
            OptionValue::Image(_) => "image",
            OptionValue::ImageMargin(_) => "imageMargin",
            OptionValue::MainShape(_) => "mainShape",
            OptionValue::ShapeColor(_) => "shapeColor",
            OptionValue::SquareShape(_) => "squareShape",
            OptionValue::SquareColor(_) => "squareColor",
            OptionValue::CornersDotShape(_) => "cornersDotShape",
            OptionValue::CornersDotColor(_) => "cornersDotColor",
            OptionValue::ErrorCorrectionLevel(_) => "errorCorrectionLevel",
        }
    }
}

impl From<OptionValue> for OptionsPatch {
    fn from(value: OptionValue) -> Self {
        let mut patch = OptionsPatch::default();
        match value {
            OptionValue::Shape(v) => patch.shape = Some(v),
            OptionValue::Size(v) => patch.size = Some(v),
            OptionValue::RemoveBrand(v) => patch.remove_brand = Some(v),
            OptionValue::Image(v) => patch.image = Some(v),
            OptionValue::ImageMargin(v) => patch.image_margin = Some(v),
            OptionValue::MainShape(v) => patch.main_shape = Some(v),
            OptionValue::ShapeColor(v) => patch.shape_color = Some(v),
            OptionValue::SquareShape(v) => patch.square_shape = Some(v),
            OptionValue::SquareColor(v) => patch.square_color = Some(v),
            OptionValue::CornersDotShape(v) => patch.corners_dot_shape = Some(v),
            OptionValue::CornersDotColor(v) => patch.corners_dot_color = Some(v),
            OptionValue::ErrorCorrectionLevel(v) => patch.error_correction_level = Some(v),
        }
        patch
    }
}

fn text(input: &FieldInput) -> Option<&str> {
    match input {
        FieldInput::Text(value) => Some(value.as_str()),
        FieldInput::Checked(_) => None,
    }
}

fn coerce_bool(input: &FieldInput) -> Option<bool> {
    match input {
        FieldInput::Checked(checked) => Some(*checked),
        FieldInput::Text(value) => match value.trim() {
            "true" | "on" | "1" => Some(true),
            "false" | "off" | "0" | "" => Some(false),
            _ => None,
        },
    }
}

fn coerce_number(input: &FieldInput) -> Option<u32> {
    let value = text(input)?.trim();
    if let Ok(n) = value.parse::<u32>() {
        return Some(n);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float >= 0.0 && float <= u32::MAX as f64 {
        Some(float.round() as u32)
    } else {
        None
    }
}
