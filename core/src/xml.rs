//! XML attribute quoting helpers.
//!
//! UI descriptors and output descriptors are emitted as literal XML element
//! strings; every attribute value sourced from user-controlled spec fields
//! (labels, help text, defaults) goes through [`quote_attr`] so embedded
//! quotes, angle brackets, and control whitespace cannot break the document.

/// Quotes a string as a double-quoted XML attribute value.
///
/// # Examples
///
/// ```
/// use toolgen_core::xml::quote_attr;
///
/// assert_eq!(quote_attr("plain"), "\"plain\"");
/// assert_eq!(quote_attr("a \"b\" <c>"), "\"a &quot;b&quot; &lt;c&gt;\"");
/// ```
pub fn quote_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            '\r' => out.push_str("&#13;"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Escapes text content (no surrounding quotes).
pub fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_attr_escapes_metacharacters() {
        assert_eq!(quote_attr("x & y"), "\"x &amp; y\"");
        assert_eq!(quote_attr("line\nbreak"), "\"line&#10;break\"");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
    }
}
