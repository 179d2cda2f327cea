//! Certificates as text: PEM armour and bare base64

use crate::certificate::Certificate;
use crate::decoder::{decode_bytes, LENIENT_BASE64};
use crate::error::{CertificateError, Result};
use base64::Engine;
use pem::{EncodeConfig, LineEnding, Pem};

const PEM_START_MARKER: &str = "-----BEGIN CERTIFICATE-----";
const PEM_END_MARKER: &str = "-----END CERTIFICATE-----";

/// Decode a certificate from text.
///
/// Blank text yields `Ok(None)`. When the text contains a PEM start marker
/// only the body between the marker line and the end marker is used, so
/// anything around the block is ignored, and a block without content is
/// [`CertificateError::NoCertificate`]. Text without markers is taken as
/// bare base64 and may contain line breaks.
pub fn decode_str(text: Option<&str>) -> Result<Option<Certificate>> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };

    let body: String = pem_body(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if body.is_empty() {
        return Err(CertificateError::NoCertificate);
    }
    let der = LENIENT_BASE64.decode(body)?;
    decode_bytes(Some(der.as_slice()))
}

/// The base64 part of `text`: the whole text unless a PEM start marker is present
fn pem_body(text: &str) -> &str {
    let Some(start) = text.find(PEM_START_MARKER) else {
        return text;
    };
    let body_start = text[start..]
        .find('\n')
        .map_or(text.len(), |offset| start + offset + 1);
    let body = &text[body_start..];
    match body.find(PEM_END_MARKER) {
        Some(end) => &body[..end],
        None => body,
    }
}

/// PEM encoding of a certificate.
///
/// The body is the base64 of the original DER bytes wrapped at 64 columns
/// with `\n` line breaks. There is no newline after the end marker.
pub fn encode_pem(cert: &Certificate) -> String {
    let pem = Pem::new("CERTIFICATE", cert.as_der());
    let mut encoded = pem::encode_config(&pem, EncodeConfig::new().set_line_ending(LineEnding::LF));
    let trimmed_len = encoded.trim_end_matches('\n').len();
    encoded.truncate(trimmed_len);
    encoded
}
