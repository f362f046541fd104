//! Markup entity decoding for caption text.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

/// Decode named, decimal and hexadecimal entities in a single pass.
///
/// `&#39;`, `&#x27;`, `&#x2F;` and `&#47;` go through the numeric forms.
/// Unknown names are left as written, as are invalid or control code points
/// (line breaks and tabs excepted).
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_RE.replace_all(text, |caps: &Captures| {
        resolve(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
}

fn resolve(body: &str) -> Option<String> {
    let decoded = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                body.strip_prefix('#')?.parse::<u32>().ok()?
            };
            let c = char::from_u32(code)?;
            // Line breaks and tabs are normalized later; other controls stay escaped.
            if c.is_control() && !matches!(c, '\n' | '\r' | '\t') {
                return None;
            }
            c
        }
    };
    Some(decoded.to_string())
}
