use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

/// Entity for each pattern of [`XML_SPECIALS`], by pattern index.
const XML_ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

static XML_SPECIALS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("static escape patterns are valid")
});

/// Append `s` to `out` with the five XML special characters escaped.
///
/// Writers that build a part in one buffer use this to skip the intermediate
/// allocation of [`escape_xml`].
#[inline]
pub fn escape_xml_into(out: &mut String, s: &str) {
    out.reserve(s.len());
    XML_SPECIALS.replace_all_with(s, out, |m, _, dst| {
        dst.push_str(XML_ENTITIES[m.pattern().as_usize()]);
        true
    });
}

/// Escape the five XML special characters for use in text or attribute values.
///
/// # Examples
///
/// ```
/// use loquat::common::xml::escape_xml;
/// assert_eq!(escape_xml("a & b"), "a &amp; b");
/// assert_eq!(escape_xml("$B$1<>\"x\""), "$B$1&lt;&gt;&quot;x&quot;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_xml_into(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_formula_operators() {
        assert_eq!(escape_xml("$B$1>50"), "$B$1&gt;50");
        assert_eq!(escape_xml("A1<>\"\""), "A1&lt;&gt;&quot;&quot;");
        assert_eq!(escape_xml("it's"), "it&apos;s");
    }

    #[test]
    fn appends_to_existing_buffer() {
        let mut out = String::from("<t>");
        escape_xml_into(&mut out, "Tom & Jerry");
        out.push_str("</t>");
        assert_eq!(out, "<t>Tom &amp; Jerry</t>");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_xml("Sheet1!$A$1:$B$4"), "Sheet1!$A$1:$B$4");
        assert_eq!(escape_xml(""), "");
    }
}
