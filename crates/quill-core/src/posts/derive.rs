//! Field deriver: slug, excerpt and meta fields computed from raw input.
//!
//! Everything here is a pure function of its arguments.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
        .expect("script/style pattern is valid")
});
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Lower-case, URL-safe slug of `text`.
///
/// Latin diacritics fold to ASCII, `&` reads as "and", and any run of other
/// characters becomes one `-`. The output only contains `[a-z0-9-]` without
/// leading, trailing or doubled dashes, so slugifying a slug is a no-op.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    let mut buf = [0u8; 4];

    for c in text.chars().flat_map(char::to_lowercase) {
        if is_combining_mark(c) {
            continue;
        }

        let piece: &str = if let Some(folded) = fold_latin(c) {
            folded
        } else if c.is_ascii_alphanumeric() {
            &*c.encode_utf8(&mut buf)
        } else {
            pending_dash = true;
            continue;
        };

        // "&" becomes a word of its own.
        let standalone = c == '&';
        if (pending_dash || standalone) && !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(piece);
        pending_dash = standalone;
    }

    slug
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

fn fold_latin(c: char) -> Option<&'static str> {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => "e",
        'ğ' => "g",
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ś' | 'š' | 'ş' => "s",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        '&' => "and",
        _ => return None,
    };
    Some(folded)
}

/// Plain text of an HTML fragment: tags dropped, common entities decoded,
/// whitespace collapsed.
pub fn strip_html(text: &str) -> String {
    let without_blocks = SCRIPT_OR_STYLE.replace_all(text, " ");
    let without_tags = HTML_TAG.replace_all(&without_blocks, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Word-safe preview of `text`.
///
/// Text within `max_len` chars is returned unchanged. Longer text is cut back
/// to the last `boundary` found in the first `max_len + len(boundary)` chars
/// and `ellipsis` is appended. When no boundary exists in that window the
/// result is empty, so a word is never split and the output never exceeds
/// `max_len + len(ellipsis)` chars.
pub fn excerpt(text: &str, max_len: usize, boundary: &str, ellipsis: &str) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    if boundary.is_empty() {
        return String::new();
    }

    let window_chars = max_len + boundary.chars().count();
    let window_end = text
        .char_indices()
        .nth(window_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let window = &text[..window_end];

    let Some(cut) = window.rfind(boundary) else {
        return String::new();
    };
    let kept = window[..cut].trim_end();
    if kept.is_empty() {
        return String::new();
    }

    format!("{kept}{ellipsis}")
}

/// First `len` chars of the plain text of `body`.
pub fn meta_description(body: &str, len: usize) -> String {
    strip_html(body).chars().take(len).collect()
}

pub fn meta_title(about: &str, site_name: &str) -> String {
    format!("{about} | {site_name}")
}
