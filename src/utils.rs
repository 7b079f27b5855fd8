use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Base64 of the UTF-8 bytes of `text`, as the contents API expects.
pub fn to_base64_utf8(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Inverse of [`to_base64_utf8`]. GitHub wraps returned content every 60
/// characters, so whitespace is stripped before decoding.
pub fn from_base64_utf8(encoded: &str) -> Result<String, String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
