//! Sanitize decoder output to valid displayable text.
//!
//! Checklist content is authored in assorted encodings and the native
//! format gives no guarantee about the bytes inside text nodes. Every
//! textual field leaving the decoder passes through here: invalid or
//! undefined byte sequences become U+FFFD rather than an error.

use std::borrow::Cow;

/// Decode raw XML text bytes into valid UTF-8, resolving entities.
///
/// Invalid byte sequences are replaced with U+FFFD. Malformed entity
/// references are left verbatim; sanitization never fails.
pub fn sanitize_xml_text(raw: &[u8]) -> String {
    let lossy: Cow<'_, str> = String::from_utf8_lossy(raw);
    match quick_xml::escape::unescape(&lossy) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => lossy.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_text_unchanged() {
        assert_eq!(sanitize_xml_text(b"Disable root login"), "Disable root login");
    }

    #[test]
    fn test_entities_resolved() {
        assert_eq!(sanitize_xml_text(b"a &lt; b &amp; c"), "a < b & c");
    }

    #[test]
    fn test_invalid_bytes_become_replacement_char() {
        // 0xE9 is latin-1 'é': invalid as a standalone UTF-8 sequence.
        let sanitized = sanitize_xml_text(b"Caf\xE9 rule");
        assert_eq!(sanitized, "Caf\u{FFFD} rule");
    }

    #[test]
    fn test_malformed_entity_never_fails() {
        let sanitized = sanitize_xml_text(b"broken &entity; text");
        assert!(sanitized.contains("entity"));
    }

    #[test]
    fn test_invalid_bytes_inside_entity_text() {
        let sanitized = sanitize_xml_text(b"\xFF\xFE&amp;\xC0");
        assert!(sanitized.contains('\u{FFFD}'));
        assert!(sanitized.contains('&'));
    }
}
