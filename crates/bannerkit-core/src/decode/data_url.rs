//! `data:` URL encoding and decoding.
//!
//! Only the base64 form is produced and accepted; every image the editor
//! embeds goes through [`encode_data_url`].

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::{DataUrl, DecodeError};

/// Build a base64 `data:` URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Parse a base64 `data:` URL into its MIME type and payload.
///
/// A missing MIME type defaults to `application/octet-stream`, as in
/// RFC 2397 minus the `text/plain` default which never holds an image.
pub fn parse_data_url(url: &str) -> Result<DataUrl, DecodeError> {
    let rest = url.strip_prefix("data:").ok_or(DecodeError::NotDataUrl)?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DecodeError::InvalidPayload("missing ',' separator".into()))?;

    let mut params = header.split(';');
    let mime_type = match params.next() {
        Some(mime) if !mime.is_empty() => mime.to_ascii_lowercase(),
        _ => "application/octet-stream".to_string(),
    };
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(DecodeError::InvalidPayload("not base64 encoded".into()));
    }

    // Tolerate whitespace some encoders insert.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::InvalidPayload(e.to_string()))?;

    Ok(DataUrl { mime_type, bytes })
}
