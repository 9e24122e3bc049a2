//! Markup and escaping helpers
//!
//! Tag stripping backs the `text` and `multitext` grammars: a value is valid
//! text exactly when stripping it changes nothing. The entity decoder and
//! backslash remover are used by the display formatter.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script block pattern")
});

static STYLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("style block pattern")
});

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|$)").expect("comment pattern"));

static PROCESSING_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<\?.*?(?:\?>|$)").expect("processing block pattern"));

// An unterminated tag runs to the end of the input.
static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[a-zA-Z/!][^>]*(?:>|$)").expect("tag pattern"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n\t ]+").expect("whitespace pattern"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z][a-zA-Z0-9]{1,31}));")
        .expect("entity pattern")
});

static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern"));

/// Remove every tag, script/style block, comment and processing block.
///
/// Removal repeats until nothing matches, so nested fragments such as
/// `<<b>script>` cannot reassemble into markup. With `collapse_breaks` every
/// run of whitespace, line breaks included, becomes one space. The result is
/// always trimmed.
pub fn strip_all_tags(value: &str, collapse_breaks: bool) -> String {
    let mut current = value.to_string();

    loop {
        let next = [&*SCRIPT_BLOCK, &*STYLE_BLOCK, &*COMMENT, &*PROCESSING_BLOCK, &*TAG]
            .iter()
            .fold(current.clone(), |text, pattern| {
                pattern.replace_all(&text, "").into_owned()
            });

        if next == current {
            break;
        }
        current = next;
    }

    if collapse_breaks {
        current = WHITESPACE_RUN.replace_all(&current, " ").into_owned();
    }

    current.trim().to_string()
}

/// Decode named and numeric HTML entities. Unknown entities are left as-is.
pub fn decode_entities(value: &str) -> String {
    ENTITY
        .replace_all(value, |caps: &Captures| {
            let decoded = if let Some(decimal) = caps.get(1) {
                decimal
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| named_entity(name.as_str()))
            };

            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "hellip" => '\u{2026}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        _ => return None,
    };
    Some(c)
}

/// Undo backslash escaping: `\x` becomes `x`, `\\` becomes `\`.
pub fn strip_slashes(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                result.push(escaped);
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Replace `<br>` markers (any case, optionally self-closing)
pub fn replace_line_breaks(value: &str, replacement: &str) -> String {
    LINE_BREAK_TAG.replace_all(value, replacement).into_owned()
}

/// Truncate to at most `max_chars` characters
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Escape the five HTML-significant characters
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_and_scripts() {
        assert_eq!(
            strip_all_tags("<p>Hello <b>there</b></p><script>alert(1)</script>", true),
            "Hello there"
        );
        assert_eq!(strip_all_tags("a <!-- note --> b", true), "a b");
        assert_eq!(strip_all_tags("keep <?php echo 1; ?>me", true), "keep me");
    }

    #[test]
    fn test_strip_tags_reaches_fixpoint() {
        assert_eq!(strip_all_tags("<<b>i>x", false), "x");
        let once = strip_all_tags("<scr<b>ipt>bad</script> ok", true);
        assert_eq!(strip_all_tags(&once, true), once);
    }

    #[test]
    fn test_strip_tags_keeps_comparisons() {
        assert_eq!(strip_all_tags("1 < 2 and 3 > 2", true), "1 < 2 and 3 > 2");
        assert_eq!(strip_all_tags("trailing <div class=", true), "trailing");
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(strip_all_tags("one\r\n\ttwo  three", true), "one two three");
        assert_eq!(strip_all_tags(" one\ntwo \n", false), "one\ntwo");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&lt;b&gt; &#39;x&#x27;"), "<b> 'x'");
        assert_eq!(decode_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
    }

    #[test]
    fn test_strip_slashes() {
        assert_eq!(strip_slashes(r#"It\'s \"quoted\""#), r#"It's "quoted""#);
        assert_eq!(strip_slashes(r"back\\slash\"), r"back\slash");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
