//! Export pipeline
//!
//! Raster formats go straight to the engine's download helper. SVG goes
//! through serialize, flatten, data URI and an anchor download, so the file
//! stands alone without nested viewports.

pub mod encoding;

pub use encoding::{encode_uri_component, svg_data_uri};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::{EXPORT_BASE_NAME, SITE};
use crate::svg::{flatten_markup, SvgError};

/// Errors produced while exporting
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("SVG export failed: {0}")]
    Svg(#[from] SvgError),

    /// The engine did not produce markup
    #[error("Engine returned no SVG markup")]
    EmptyMarkup,

    #[error("Download failed: {0}")]
    Download(String),
}

/// Download formats offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl ExportFormat {
    /// Parse a file extension (`"jpg"` and `"jpeg"` both mean JPEG)
    pub fn from_extension(ext: &str) -> Result<ExportFormat, ExportError> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(ExportError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Extension passed to the engine and used in the file name
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Webp => "webp",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, ExportFormat::Svg)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::from_extension(s)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `QRCode.<ext>`
pub fn artifact_name(format: ExportFormat) -> String {
    format!("{}.{}", EXPORT_BASE_NAME, format.extension())
}

/// Comments placed before the root of every exported SVG
pub fn attribution_comments() -> Vec<String> {
    vec![
        format!(" Created with the {} QR code generator ", SITE.long_name),
        format!(" {} ", SITE.url),
    ]
}

/// Flatten serialized engine markup for a standalone file
pub fn flatten_for_export(markup: &str) -> Result<String, ExportError> {
    if markup.trim().is_empty() {
        return Err(ExportError::EmptyMarkup);
    }
    let (flattened, report) = flatten_markup(markup, &attribution_comments())?;
    log::info!(
        "Flattened {} nested svg element(s), skipped {}",
        report.flattened,
        report.skipped
    );
    Ok(flattened)
}

/// Browser-side download operations
pub trait ExportTarget {
    /// Let the engine rasterize and download `<name>.<extension>`
    fn download_raster(&mut self, extension: &str, name: &str, size: u32) -> Result<(), ExportError>;
    /// Trigger a download of `url` under `filename`
    fn download_url(&mut self, url: &str, filename: &str) -> Result<(), ExportError>;
}

/// Ties formats, flattening and naming to an `ExportTarget`
pub struct ExportPipeline<T: ExportTarget> {
    target: T,
}

impl<T: ExportTarget> ExportPipeline<T> {
    pub fn new(target: T) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Raster export through the engine at `size` x `size`
    pub fn export_raster(&mut self, format: ExportFormat, size: u32) -> Result<(), ExportError> {
        if format.is_vector() {
            return Err(ExportError::UnsupportedFormat(format.to_string()));
        }
        log::info!("Exporting {} at {}px", artifact_name(format), size);
        self.target
            .download_raster(format.extension(), EXPORT_BASE_NAME, size)
    }

    /// Second half of a vector export: the engine has serialized `markup`
    pub fn export_vector(&mut self, markup: &str) -> Result<String, ExportError> {
        let flattened = flatten_for_export(markup)?;
        let uri = svg_data_uri(&flattened);
        let filename = artifact_name(ExportFormat::Svg);
        self.target.download_url(&uri, &filename)?;
        log::info!("Exported {} ({} bytes of markup)", filename, flattened.len());
        Ok(filename)
    }
}
