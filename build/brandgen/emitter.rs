//! Emit branding.rs from a validated BrandingSpec
//!
//! Strings go through `{:?}` so quotes and backslashes come out as valid
//! Rust literals.

use super::BrandingSpec;

pub fn emit_rust(spec: &BrandingSpec) -> String {
    let mut out = String::new();
    out.push_str("// @generated by build.rs from config/branding.yaml\n\n");

    out.push_str("/// Website advertised by the generator\n");
    out.push_str("pub const SITE: SiteInfo = SiteInfo {\n");
    out.push_str(&format!("    url: {:?},\n", spec.site.url));
    out.push_str(&format!("    name: {:?},\n", spec.site.name));
    out.push_str(&format!("    long_name: {:?},\n", spec.site.long_name));
    out.push_str(&format!("    short_name: {:?},\n", spec.site.short_name));
    out.push_str(&format!("    header_logo: {:?},\n", spec.site.header_logo));
    out.push_str("};\n\n");

    out.push_str("/// Year the project was first published (footer copyright)\n");
    out.push_str(&format!("pub const CREATION_YEAR: i32 = {};\n\n", spec.creation_year));

    out.push_str("/// Logo shown in the center of the code by default\n");
    out.push_str(&format!("pub const DEFAULT_BRAND: &str = {:?};\n\n", spec.default_brand));

    out.push_str("/// Logos selectable from the embedded logo dropdown\n");
    out.push_str("pub const EMBEDDED_LOGOS: &[EmbeddedLogo] = &[\n");
    for logo in &spec.logos {
        out.push_str(&format!(
            "    EmbeddedLogo {{ path: {:?}, label: {:?} }},\n",
            logo.path, logo.label
        ));
    }
    out.push_str("];\n");

    out
}
