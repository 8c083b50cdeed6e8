//! `data:` URL codec for inline asset payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use assethub_core::error::AppError;
use assethub_core::result::AppResult;

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
    /// Raw payload bytes.
    pub bytes: Vec<u8>,
}

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Parse a `data:` URL.
///
/// Payloads without the `;base64` marker are taken verbatim.
pub fn parse(url: &str) -> AppResult<DataUrl> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| AppError::validation("Not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AppError::validation("Data URL has no payload separator"))?;

    let mut params = header.split(';');
    let mime_type = params
        .next()
        .filter(|m| !m.is_empty())
        .unwrap_or("text/plain")
        .to_string();
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        STANDARD.decode(payload.trim())?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok(DataUrl { mime_type, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_then_parse_is_byte_identical() {
        let bytes: Vec<u8> = (0..=255).collect();
        let url = encode("image/png", &bytes);
        assert!(url.starts_with("data:image/png;base64,"));

        let decoded = parse(&url).expect("parse");
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, bytes);
    }

    #[test]
    fn test_plain_payload() {
        let decoded = parse("data:image/svg+xml;utf8,<svg/>").expect("parse");
        assert_eq!(decoded.mime_type, "image/svg+xml");
        assert_eq!(decoded.bytes, b"<svg/>");
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse("http://example.com/a.png").is_err());
        assert!(parse("data:image/png;base64").is_err());
        assert!(parse("data:image/png;base64,@@@").is_err());
    }
}
