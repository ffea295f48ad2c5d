//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present. There is no DTD
//! processing, so any other entity name is an error.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity references in text or an attribute value
///
/// On failure returns the message and the byte offset of the offending
/// reference within `input`.
pub fn decode_text(input: &str) -> Result<Cow<'_, str>, (&'static str, usize)> {
    let bytes = input.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return Ok(Cow::Borrowed(input));
    }

    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp;
        result.push_str(&input[pos..amp]);

        let semi = memchr(b';', &bytes[amp..])
            .map(|i| amp + i)
            .ok_or(("Unterminated entity reference", amp))?;
        let decoded = decode_entity(&input[amp + 1..semi]).ok_or(("Undefined entity", amp))?;
        result.push(decoded);
        pos = semi + 1;
    }
    result.push_str(&input[pos..]);

    Ok(Cow::Owned(result))
}

/// Decode a single entity name (between '&' and ';')
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let numeric = entity.strip_prefix('#')?;
            let code = match numeric.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => numeric.parse::<u32>().ok()?,
            };
            char::from_u32(code).filter(|c| is_xml_char(*c))
        }
    }
}

/// Check whether a character is allowed in an XML 1.0 document
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}
