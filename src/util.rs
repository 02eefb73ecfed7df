//! Small parsing and formatting helpers: video ids and `HH:MM:SS` times.

use crate::error::InputError;

const ID_LEN: usize = 11;

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_bare_id(s: &str) -> bool {
    s.len() == ID_LEN && s.chars().all(is_id_char)
}

/// Extract the 11-character video id from a watch URL or a bare id.
///
/// Accepted links look like `https://www.youtube.com/watch?v=<id>` (`http`,
/// `www.` and `m.` variants included) with nothing before or after it.
/// Surrounding whitespace is rejected; callers trim typed input themselves.
pub fn get_id(link_or_id: &str) -> Result<String, InputError> {
    let s = link_or_id;
    if is_bare_id(s) {
        return Ok(s.to_string());
    }

    let rest = s
        .strip_prefix("https://")
        .or_else(|| s.strip_prefix("http://"))
        .ok_or_else(|| InputError::InvalidLink(link_or_id.to_string()))?;
    let rest = rest
        .strip_prefix("www.")
        .or_else(|| rest.strip_prefix("m."))
        .unwrap_or(rest);

    match rest.strip_prefix("youtube.com/watch?v=") {
        Some(id) if is_bare_id(id) => Ok(id.to_string()),
        _ => Err(InputError::InvalidLink(link_or_id.to_string())),
    }
}

/// Format seconds as `HH:MM:SS`. Fractions are floored.
pub fn raw_number_to_time(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

/// Parse a strict `HH:MM:SS` string into seconds.
pub fn time_string_to_seconds(time: &str) -> Result<u32, InputError> {
    let bad = || InputError::InvalidTime(time.to_string());

    let bytes = time.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return Err(bad());
    }

    let mut total: u32 = 0;
    for (field, scale) in [(&time[0..2], 3600), (&time[3..5], 60), (&time[6..8], 1)] {
        if !field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let v: u32 = field.parse().map_err(|_| bad())?;
        total += v * scale;
    }
    Ok(total)
}

/// Decode literal `\uXXXX` escapes that the resolution service leaves in titles.
///
/// Sequences that are not valid code points are kept verbatim.
pub fn decode_unicode_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let decoded = after
            .get(..4)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                out.push(c);
                rest = &after[4..];
            }
            None => {
                out.push_str("\\u");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
