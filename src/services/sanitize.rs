//! HTML sanitization for user-supplied text
//!
//! A whitelist filter: known-safe tags are kept with only their known-safe
//! attributes, everything else that looks like a tag is escaped so that it
//! renders as text. Stored values are never modified; filtering happens when
//! a record is serialized for a client.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Anything shaped like a tag
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("valid tag regex"));

/// `<`, optional `/`, tag name, attribute text, optional self-closing `/`, `>`
static TAG_PARTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^<\s*(/?)\s*([a-zA-Z][a-zA-Z0-9]*)(.*?)(/?)\s*>$").expect("valid tag parts regex")
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute regex")
});

/// Numeric character references; browsers accept them without the `;`
static NUMERIC_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));?").expect("valid numeric reference regex")
});

/// Named references that can spell out a scheme
static NAMED_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)&(colon|tab|newline|amp|sol|period|lpar|rpar|quot|apos|lt|gt);")
        .expect("valid named reference regex")
});

/// Allowed tags and, per tag, the attributes allowed on it
static WHITELIST: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert("a", &["target", "href", "title"]);
    m.insert("abbr", &["title"]);
    m.insert("audio", &["autoplay", "controls", "loop", "preload", "src"]);
    m.insert("blockquote", &["cite"]);
    m.insert("col", &["align", "valign", "span", "width"]);
    m.insert("del", &["datetime"]);
    m.insert("details", &["open"]);
    m.insert("font", &["color", "size", "face"]);
    m.insert("img", &["src", "alt", "title", "width", "height"]);
    m.insert("ins", &["datetime"]);
    m.insert("table", &["width", "border", "align", "valign"]);
    m.insert("td", &["width", "rowspan", "colspan", "align", "valign"]);
    m.insert("th", &["width", "rowspan", "colspan", "align", "valign"]);
    m.insert("tr", &["rowspan", "align", "valign"]);
    m.insert("video", &["autoplay", "controls", "loop", "preload", "src", "height", "width"]);
    for tag in [
        "address", "article", "aside", "b", "big", "br", "caption", "center", "cite", "code",
        "dd", "div", "dl", "dt", "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4",
        "h5", "h6", "header", "hr", "i", "kbd", "li", "mark", "nav", "ol", "p", "pre", "s",
        "section", "small", "span", "strike", "strong", "sub", "summary", "sup", "tbody",
        "tfoot", "thead", "tt", "u", "ul",
    ] {
        m.insert(tag, &[]);
    }
    m
});

/// Attributes holding a URL, checked against [`SAFE_URL_PREFIXES`]
const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];

const SAFE_URL_PREFIXES: &[&str] = &["http:", "https:", "mailto:", "tel:", "ftp:", "data:image/"];

/// Filter `input` so that it is safe to render as HTML.
///
/// ```
/// use blog_server::services::sanitize_html;
///
/// assert_eq!(sanitize_html("<b>hi</b><script>"), "<b>hi</b>&lt;script&gt;");
/// ```
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;

    for tag in TAG_RE.find_iter(input) {
        out.push_str(&escape_text(&input[last..tag.start()]));
        out.push_str(&filter_tag(tag.as_str()));
        last = tag.end();
    }
    out.push_str(&escape_text(&input[last..]));

    out
}

fn escape_text(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr_value(value: &str) -> String {
    value
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn filter_tag(raw: &str) -> String {
    let Some(parts) = TAG_PARTS_RE.captures(raw) else {
        return escape_text(raw);
    };

    let name = parts[2].to_ascii_lowercase();
    let Some(allowed) = WHITELIST.get(name.as_str()) else {
        return escape_text(raw);
    };

    if !parts[1].is_empty() {
        return format!("</{}>", name);
    }

    let attrs: Vec<String> = ATTR_RE
        .captures_iter(&parts[3])
        .filter_map(|attr| {
            let attr_name = attr[1].to_ascii_lowercase();
            if !allowed.contains(&attr_name.as_str()) {
                return None;
            }
            let value = attr.get(2).or_else(|| attr.get(3)).or_else(|| attr.get(4));
            match value {
                None => Some(attr_name),
                Some(value) => {
                    let value = value.as_str().trim();
                    if URL_ATTRIBUTES.contains(&attr_name.as_str()) && !is_safe_url(value) {
                        return None;
                    }
                    Some(format!("{}=\"{}\"", attr_name, escape_attr_value(value)))
                }
            }
        })
        .collect();

    let mut tag = format!("<{}", name);
    if !attrs.is_empty() {
        tag.push(' ');
        tag.push_str(&attrs.join(" "));
    }
    if !parts[4].is_empty() {
        tag.push_str(" /");
    }
    tag.push('>');
    tag
}

/// Decode the character references a browser would resolve in an
/// attribute value
fn decode_char_refs(value: &str) -> String {
    let numeric = NUMERIC_REF_RE.replace_all(value, |caps: &regex::Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string()
    });

    NAMED_REF_RE
        .replace_all(&numeric, |caps: &regex::Captures| {
            let decoded = match caps[1].to_ascii_lowercase().as_str() {
                "colon" => ":",
                "tab" => "\t",
                "newline" => "\n",
                "amp" => "&",
                "sol" => "/",
                "period" => ".",
                "lpar" => "(",
                "rpar" => ")",
                "quot" => "\"",
                "apos" => "'",
                "lt" => "<",
                _ => ">",
            };
            decoded.to_string()
        })
        .into_owned()
}

/// Relative URLs and URLs with a whitelisted scheme are safe.
///
/// The scheme is read after character references are decoded; a value
/// that still holds a reference after one decoding pass is rejected.
fn is_safe_url(value: &str) -> bool {
    let compact: String = decode_char_refs(value)
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if compact.contains("&#") || NAMED_REF_RE.is_match(&compact) {
        return false;
    }

    let scheme_end = compact.find(':');
    let path_start = compact.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (None, _) => true,
        (Some(colon), Some(slash)) if slash < colon => true,
        _ => SAFE_URL_PREFIXES.iter().any(|prefix| compact.starts_with(prefix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tags_are_escaped() {
        assert_eq!(
            sanitize_html(r#"Naughty naughty very naughty <script>alert("xss");</script>"#),
            r#"Naughty naughty very naughty &lt;script&gt;alert("xss");&lt;/script&gt;"#
        );
    }

    #[test]
    fn test_event_handlers_are_stripped_and_benign_tags_kept() {
        let input = r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#;
        assert_eq!(
            sanitize_html(input),
            r#"Bad image <img src="https://url.to.file.which/does-not.exist">. But not <strong>all</strong> bad."#
        );
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let text = r#"Lorem ipsum & "quoted" 'single' text"#;
        assert_eq!(sanitize_html(text), text);
    }

    #[test]
    fn test_stray_angle_brackets_are_escaped() {
        assert_eq!(sanitize_html("1 < 2 > 0"), "1 &lt; 2 &gt; 0");
        assert_eq!(sanitize_html("a <<b>b</b>"), "a &lt;<b>b</b>");
    }

    #[test]
    fn test_javascript_urls_are_dropped() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)" title="t">x</a>"#),
            r#"<a title="t">x</a>"#
        );
        assert_eq!(
            sanitize_html("<a href=' JaVa\tScRiPt:alert(1)'>x</a>"),
            "<a>x</a>"
        );
        assert_eq!(sanitize_html(r#"<a href="java&#115;cript:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(sanitize_html(r#"<a href="&#106;avascript:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(sanitize_html(r#"<a href="javascript&colon;alert(1)">x</a>"#), "<a>x</a>");
    }

    #[test]
    fn test_entity_encoded_javascript_urls_are_dropped() {
        for input in [
            r#"<a href="java&#115;cript:alert(1)">x</a>"#,
            r#"<a href="&#106;avascript:alert(1)">x</a>"#,
            r#"<a href="javascript&colon;alert(1)">x</a>"#,
            r#"<a href="&#x6A;avascript:alert(1)">x</a>"#,
            r#"<a href="&#X6a;avascript&COLON;alert(1)">x</a>"#,
            r#"<a href="&#0000106avascript:alert(1)">x</a>"#,
            r#"<a href="jav&Tab;ascript:alert(1)">x</a>"#,
            r#"<a href="java&NewLine;script:alert(1)">x</a>"#,
            r#"<img src="javascript&amp;colon;alert(1)">"#,
        ] {
            let output = sanitize_html(input);
            assert!(!output.contains("href") && !output.contains("src"), "{} -> {}", input, output);
        }
    }

    #[test]
    fn test_entity_encoded_safe_urls_are_kept() {
        assert_eq!(
            sanitize_html(r#"<a href="https&#58;//example.com/?a=1&amp;b=2">x</a>"#),
            r#"<a href="https&#58;//example.com/?a=1&amp;b=2">x</a>"#
        );
    }

    #[test]
    fn test_decode_char_refs() {
        assert_eq!(decode_char_refs("java&#115;cript&colon;"), "javascript:");
        assert_eq!(decode_char_refs("&#x6A;&#106&amp;"), "jj&");
        assert_eq!(decode_char_refs("&#1114112;"), "\u{FFFD}");
        assert_eq!(decode_char_refs("plain"), "plain");
    }

    #[test]
    fn test_relative_and_http_urls_are_kept() {
        assert_eq!(sanitize_html(r#"<a href="/articles/1">x</a>"#), r#"<a href="/articles/1">x</a>"#);
        assert_eq!(sanitize_html("<a href=page.html>x</a>"), r#"<a href="page.html">x</a>"#);
        assert_eq!(
            sanitize_html("<img src='http://example.com/a.png' alt=\"a\" />"),
            r#"<img src="http://example.com/a.png" alt="a" />"#
        );
    }

    #[test]
    fn test_tag_names_are_case_insensitive() {
        assert_eq!(sanitize_html("<STRONG>x</STRONG>"), "<strong>x</strong>");
        assert_eq!(sanitize_html("<ScRiPt>"), "&lt;ScRiPt&gt;");
    }

    #[test]
    fn test_comments_and_unknown_tags_are_escaped() {
        assert_eq!(sanitize_html("<!-- hi -->"), "&lt;!-- hi --&gt;");
        assert_eq!(
            sanitize_html(r#"<iframe src="https://evil.example"></iframe>"#),
            r#"&lt;iframe src="https://evil.example"&gt;&lt;/iframe&gt;"#
        );
    }

    #[test]
    fn test_valueless_whitelisted_attribute() {
        assert_eq!(sanitize_html("<details open>x</details>"), "<details open>x</details>");
    }
}
