//! Extraction of the artwork record embedded in a catalog page.
//!
//! Artwork pages ship their GraphQL bootstrap data as an escaped JSON string
//! assigned to `__RELAY_BOOTSTRAP__` inside a script tag:
//!
//! ```text
//! <script>var __RELAY_BOOTSTRAP__ = "[[\"query\",{\"json\":{\"data\":{\"artwork\":{...}}}}]]";</script>
//! ```
//!
//! The string is unescaped, parsed, and the record at
//! `[0][1].json.data.artwork` is turned into an [`Artwork`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::descriptor::{is_file_name_component, Artwork, RawArtwork};
use crate::error::ExtractError;

/// Pattern locating the bootstrap assignment. `.` stops at the end of the line
/// and the greedy match ends at the last quote on it.
const BOOTSTRAP_PATTERN: &str = r#"__RELAY_BOOTSTRAP__\s*=\s*"(.*)""#;

/// JSON pointer to the artwork record inside the bootstrap payload.
const ARTWORK_POINTER: &str = "/0/1/json/data/artwork";

fn bootstrap_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(BOOTSTRAP_PATTERN).expect("bootstrap pattern is valid"))
}

/// Extract the artwork record from a page's HTML.
pub fn extract_artwork(html: &str) -> Result<Artwork, ExtractError> {
    let raw = bootstrap_regex()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or(ExtractError::MarkerNotFound)?
        .as_str();

    debug!(bytes = raw.len(), "Found bootstrap payload");

    let json = unescape(raw)?;
    parse_bootstrap_payload(&json)
}

/// Parse an already-unescaped bootstrap payload.
pub fn parse_bootstrap_payload(json: &str) -> Result<Artwork, ExtractError> {
    let mut payload: Value =
        serde_json::from_str(json).map_err(|e| ExtractError::Json(e.to_string()))?;

    let record = payload
        .pointer_mut(ARTWORK_POINTER)
        .filter(|v| !v.is_null())
        .map(Value::take)
        .ok_or(ExtractError::MissingField("[0][1].json.data.artwork"))?;

    let raw: RawArtwork =
        serde_json::from_value(record).map_err(|e| ExtractError::Json(e.to_string()))?;

    let slug = raw.slug.ok_or(ExtractError::MissingField("slug"))?;
    if !is_file_name_component(&slug) {
        return Err(ExtractError::InvalidSlug(slug));
    }

    let mut figures = Vec::with_capacity(raw.figures.len());
    for (index, figure) in raw.figures.into_iter().enumerate() {
        let Some(deep_zoom) = figure.deep_zoom else {
            warn!(figure = index, "Figure has no deep-zoom record, skipping");
            continue;
        };
        let descriptor = deep_zoom.image.into_descriptor(index);
        descriptor.validate()?;
        figures.push(descriptor);
    }

    Ok(Artwork { slug, figures })
}

/// Decode the escape sequences of a JavaScript string literal body.
///
/// Handles the single-character escapes, `\xHH`, `\uXXXX` (including
/// surrogate pairs) and `\u{...}`. Unknown escapes yield the escaped
/// character itself, as JavaScript does.
pub fn unescape(input: &str) -> Result<String, ExtractError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let esc = chars
            .next()
            .ok_or_else(|| ExtractError::Unescape("trailing backslash".to_string()))?;

        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            '0' => out.push('\0'),
            'x' => {
                let code = read_hex(&mut chars, 2)?;
                out.push(to_char(code)?);
            }
            'u' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(d) => digits.push(d),
                            None => {
                                return Err(ExtractError::Unescape(
                                    "unterminated \\u{...} escape".to_string(),
                                ))
                            }
                        }
                    }
                    let code = u32::from_str_radix(&digits, 16).map_err(|_| {
                        ExtractError::Unescape(format!("invalid code point {:?}", digits))
                    })?;
                    out.push(to_char(code)?);
                    continue;
                }

                let high = read_hex(&mut chars, 4)?;
                if (0xD800..0xDC00).contains(&high) {
                    // A high surrogate must be followed by an escaped low surrogate.
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(ExtractError::Unescape(format!(
                            "unpaired surrogate \\u{:04X}",
                            high
                        )));
                    }
                    let low = read_hex(&mut chars, 4)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(ExtractError::Unescape(format!(
                            "invalid low surrogate \\u{:04X}",
                            low
                        )));
                    }
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    out.push(to_char(code)?);
                } else {
                    out.push(to_char(high)?);
                }
            }
            // Line continuation
            '\n' => {}
            other => out.push(other),
        }
    }

    Ok(out)
}

fn read_hex(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    len: usize,
) -> Result<u32, ExtractError> {
    let digits: String = chars.by_ref().take(len).collect();
    if digits.len() != len {
        return Err(ExtractError::Unescape(format!(
            "expected {} hex digits, got {:?}",
            len, digits
        )));
    }
    u32::from_str_radix(&digits, 16)
        .map_err(|_| ExtractError::Unescape(format!("invalid hex digits {:?}", digits)))
}

fn to_char(code: u32) -> Result<char, ExtractError> {
    char::from_u32(code)
        .ok_or_else(|| ExtractError::Unescape(format!("invalid code point U+{:04X}", code)))
}

// =============================================================================
// Tests
// =============================================================================
