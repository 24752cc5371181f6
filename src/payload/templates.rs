//! Mustache templates for the multi-line payloads
//!
//! Values are inserted with triple braces: the encodings carry raw user
//! text and must not be HTML-escaped.

use serde::Serialize;

use super::PayloadError;

/// Multi-line payload layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadTemplate {
    /// iCalendar VEVENT
    Event,
    /// vCard 3.0
    VCard,
}

pub fn get_template_content(template: PayloadTemplate) -> &'static str {
    match template {
        PayloadTemplate::Event => include_str!("templates/vevent.mustache"),
        PayloadTemplate::VCard => include_str!("templates/vcard.mustache"),
    }
}

/// Render `context` into the given template
pub fn render_payload<T: Serialize>(template: PayloadTemplate, context: &T) -> Result<String, PayloadError> {
    let compiled = mustache::compile_str(get_template_content(template))
        .map_err(|e| PayloadError::Template(format!("{:?}: {}", template, e)))?;
    compiled
        .render_to_string(context)
        .map_err(|e| PayloadError::Template(format!("{:?}: {}", template, e)))
}

/// Flat string context for the VEVENT template
#[derive(Debug, Clone, Serialize)]
pub struct EventContext {
    pub uid: String,
    pub summary: String,
    pub dtstart: String,
    pub dtend: String,
    pub location: String,
    pub latitude: String,
    pub longitude: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_have_no_trailing_newline() {
        assert!(get_template_content(PayloadTemplate::Event).ends_with("END:VEVENT"));
        assert!(get_template_content(PayloadTemplate::VCard).ends_with("END:VCARD"));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let context = EventContext {
            uid: "abc1234".to_string(),
            summary: "Fish & <chips>".to_string(),
            dtstart: "20240101T100000Z".to_string(),
            dtend: "20240101T110000Z".to_string(),
            location: "Here".to_string(),
            latitude: "1".to_string(),
            longitude: "2".to_string(),
            description: "\"quoted\"".to_string(),
        };
        let out = render_payload(PayloadTemplate::Event, &context).unwrap();
        assert!(out.contains("SUMMARY:Fish & <chips>\n"));
        assert!(out.contains("DESCRIPTION:\"quoted\"\n"));
        assert!(out.contains("GEO:1;2\n"));
    }
}
