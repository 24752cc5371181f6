//! Data URI construction

const SVG_DATA_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";

/// Same output as JavaScript's `encodeURIComponent`: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is written as UTF-8 `%XX`
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 3 / 2);
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// `data:image/svg+xml;charset=utf-8,` + percent-encoded markup
pub fn svg_data_uri(markup: &str) -> String {
    format!("{}{}", SVG_DATA_PREFIX, encode_uri_component(markup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_uri_component() {
        assert_eq!(encode_uri_component("a b"), "a%20b");
        assert_eq!(encode_uri_component("<svg id=\"x\"/>"), "%3Csvg%20id%3D%22x%22%2F%3E");
        assert_eq!(encode_uri_component("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(encode_uri_component("#&%,;"), "%23%26%25%2C%3B");
        assert_eq!(encode_uri_component("é"), "%C3%A9");
    }

    #[test]
    fn test_svg_data_uri() {
        assert_eq!(svg_data_uri("<svg/>"), "data:image/svg+xml;charset=utf-8,%3Csvg%2F%3E");
    }
}
