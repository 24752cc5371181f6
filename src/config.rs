//! Application configuration
//!
//! Branding and the embedded logo catalogue come from `config/branding.yaml`,
//! validated by `build.rs` and compiled in as constants. The remaining
//! constants are fixed by the storage and export contracts.

/// Website advertised by the generator (header, footer, default QR data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub url: &'static str,
    pub name: &'static str,
    pub long_name: &'static str,
    pub short_name: &'static str,
    pub header_logo: &'static str,
}

/// A logo that ships with the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct EmbeddedLogo {
    pub path: &'static str,
    pub label: &'static str,
}

include!(concat!(env!("OUT_DIR"), "/branding.rs"));

/// localStorage key holding the saved style
pub const STORAGE_KEY: &str = "qr-code";

/// Largest accepted logo upload (2 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 2_097_152;

/// Base name of every downloaded artifact
pub const EXPORT_BASE_NAME: &str = "QRCode";

/// Export size slider range (pixels)
pub const SIZE_MIN: u32 = 500;
pub const SIZE_MAX: u32 = 1500;
pub const SIZE_STEP: u32 = 50;

/// Logo margin input range (UI units, tenths of the engine's margin unit)
pub const IMAGE_MARGIN_MAX: u32 = 100;

/// Footer copyright range, e.g. "2024" or "2024-2026"
pub fn copyright_years(current_year: i32) -> String {
    if current_year <= CREATION_YEAR {
        CREATION_YEAR.to_string()
    } else {
        format!("{}-{}", CREATION_YEAR, current_year)
    }
}

/// Look up an embedded logo by its path
pub fn find_logo(path: &str) -> Option<&'static EmbeddedLogo> {
    EMBEDDED_LOGOS.iter().find(|logo| logo.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_brand_is_in_catalogue() {
        assert!(find_logo(DEFAULT_BRAND).is_some());
    }

    #[test]
    fn test_copyright_years() {
        assert_eq!(copyright_years(CREATION_YEAR), CREATION_YEAR.to_string());
        assert_eq!(
            copyright_years(CREATION_YEAR + 2),
            format!("{}-{}", CREATION_YEAR, CREATION_YEAR + 2)
        );
    }

    #[test]
    fn test_unknown_logo() {
        assert!(find_logo("/nope.svg").is_none());
    }
}
