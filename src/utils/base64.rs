use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

/// Decoder config accepting input with or without `=` padding.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Encodes a string to Base64 format.
pub fn base64_encode(input: &str) -> String {
    general_purpose::STANDARD.encode(input)
}

/// Encodes a string to URL-safe Base64 format without padding.
pub fn url_safe_base64_encode(input: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(input)
}

/// Decodes Base64 bytes, trying the standard alphabet first and the URL-safe
/// one second. Padding is optional and whitespace inside the input is ignored,
/// so line-wrapped payloads decode as a whole.
pub fn base64_decode_bytes(input: &str) -> Option<Vec<u8>> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    STANDARD_LENIENT
        .decode(&cleaned)
        .or_else(|_| URL_SAFE_LENIENT.decode(&cleaned))
        .ok()
}

/// Decodes a Base64 string to UTF-8 text.
///
/// # Returns
/// The decoded text, or `None` if the input is not Base64 or does not decode
/// to UTF-8.
pub fn base64_decode(input: &str) -> Option<String> {
    base64_decode_bytes(input).and_then(|bytes| String::from_utf8(bytes).ok())
}

/// Decodes a URL-safe Base64 string. Standard alphabet input is accepted too.
pub fn url_safe_base64_decode(input: &str) -> Option<String> {
    base64_decode(input)
}

/// Returns the decoded text if `input` as a whole is a Base64 payload that
/// decodes to non-empty text.
///
/// Anything containing characters outside the two Base64 alphabets (such as
/// the `://` of a link) is rejected without attempting a decode.
pub fn decode_b64_if_valid(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let alphabet_only = input.chars().all(|c| {
        c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '+' | '/' | '-' | '_' | '=')
    });
    if !alphabet_only {
        return None;
    }

    base64_decode(input).filter(|text| !text.trim().is_empty())
}
