//! Decoding of generation and background-removal service responses.
//!
//! The transport is the caller's; these helpers only turn a response body
//! into an [`ImageRef`] with its natural size filled in.

use serde::Deserialize;
use serde_json::Value;

use super::ServiceError;
use crate::composition::ImageRef;
use crate::decode::{encode_data_url, read_image_ref};

const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
    #[serde(default)]
    mime_type: Option<String>,
}

/// Extract the first inline image of a `generateContent` style response.
///
/// The body looks like
/// `{"candidates":[{"content":{"parts":[{"text":..},{"inlineData":{"mimeType":..,"data":..}}]}}]}`.
pub fn parse_generation_response(body: &str) -> Result<ImageRef, ServiceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    if let Some(message) = error_message(&value) {
        return Err(ServiceError::from_remote_message(message));
    }

    let parts = value
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::MalformedResponse("missing candidates".into()))?;
    let inline = parts
        .iter()
        .find_map(|part| part.get("inlineData"))
        .ok_or_else(|| ServiceError::MalformedResponse("no image data in response".into()))?;
    let inline: InlineData = serde_json::from_value(inline.clone())
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    let mime_type = inline.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
    let url = format!("data:{};base64,{}", mime_type, inline.data);
    read_image_ref(&url).map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}

/// Decode a `{"imageUrl": "data:..."}` background-removal response.
pub fn parse_removal_response(body: &str) -> Result<ImageRef, ServiceError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;

    if let Some(message) = error_message(&value) {
        return Err(ServiceError::from_remote_message(message));
    }

    let url = value
        .get("imageUrl")
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::MalformedResponse("missing imageUrl".into()))?;
    read_image_ref(url).map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}

/// Wrap raw PNG bytes returned by a removal service.
pub fn removal_bytes_to_image(bytes: &[u8]) -> Result<ImageRef, ServiceError> {
    read_image_ref(&encode_data_url(DEFAULT_MIME_TYPE, bytes))
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}

fn error_message(value: &Value) -> Option<&str> {
    match value.get("error")? {
        Value::String(message) => Some(message.as_str()),
        other => other.get("message").and_then(Value::as_str),
    }
}
