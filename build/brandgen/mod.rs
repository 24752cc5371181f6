/// Branding definition module
///
/// This module defines the BrandingSpec structures and validation logic
/// for the site branding and embedded logo catalogue. It's used by build.rs to:
/// 1. Parse and validate config/branding.yaml
/// 2. Emit branding.rs (Rust constants) into OUT_DIR
///
/// The crate pulls the generated file in with `include!` from `src/config.rs`.

pub mod emitter;

use serde::Deserialize;
use std::collections::HashSet;

/// The complete branding definition
#[derive(Debug, Clone, Deserialize)]
pub struct BrandingSpec {
    pub site: SiteSpec,
    pub creation_year: i32,
    pub default_brand: String,
    pub logos: Vec<LogoSpec>,
}

/// Website advertised by the generator (footer, header, default QR data)
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSpec {
    pub url: String,
    pub name: String,
    pub long_name: String,
    pub short_name: String,
    pub header_logo: String,
}

/// One entry of the embedded logo dropdown
#[derive(Debug, Clone, Deserialize)]
pub struct LogoSpec {
    pub path: String,
    pub label: String,
}

/// Validation result with detailed error messages
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, msg: String) {
        self.is_valid = false;
        self.errors.push(msg);
    }

    pub fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }
}

impl BrandingSpec {
    /// Parse the YAML source
    pub fn from_yaml(source: &str) -> Result<Self, String> {
        serde_yaml::from_str(source).map_err(|e| format!("Invalid branding.yaml: {}", e))
    }

    /// Validate the BrandingSpec for consistency
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if !self.site.url.starts_with("http://") && !self.site.url.starts_with("https://") {
            result.add_error(format!("site.url '{}' must be an http(s) URL", self.site.url));
        }

        if !(2000..=2100).contains(&self.creation_year) {
            result.add_error(format!("creation_year {} is out of range", self.creation_year));
        }

        if self.logos.is_empty() {
            result.add_error("logos must list at least one logo".to_string());
        }

        let mut seen_paths = HashSet::new();
        for logo in &self.logos {
            if !logo.path.starts_with('/') {
                result.add_error(format!("Logo path '{}' must be absolute", logo.path));
            }
            if logo.label.trim().is_empty() {
                result.add_error(format!("Logo '{}' has an empty label", logo.path));
            }
            if !seen_paths.insert(logo.path.as_str()) {
                result.add_error(format!("Duplicate logo path: '{}'", logo.path));
            }
        }

        if !seen_paths.contains(self.default_brand.as_str()) {
            result.add_error(format!(
                "default_brand '{}' is not in the logo catalogue",
                self.default_brand
            ));
        }

        if !self.site.header_logo.starts_with('/') {
            result.add_warning(format!(
                "site.header_logo '{}' is not an absolute path",
                self.site.header_logo
            ));
        }

        result
    }
}
