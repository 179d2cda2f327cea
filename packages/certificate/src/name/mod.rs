//! Distinguished name rendering, parsing and comparison

pub mod attributes;
mod canonical;

pub use canonical::names_match;

use crate::error::{CertificateError, Result};
use const_oid::ObjectIdentifier;
use der::asn1::SetOfVec;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

/// Render a name most-specific RDN first, e.g.
/// `CN=partya.examples.holodeck-b2b.com,OU=Holodeck B2B Support,O=Chasquis,C=NL`
pub fn render(name: &Name) -> String {
    name.0
        .iter()
        .rev()
        .map(|rdn| {
            rdn.0
                .iter()
                .map(render_attribute)
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn render_attribute(atv: &AttributeTypeAndValue) -> String {
    let value = match attributes::text(&atv.value) {
        Some(text) => escape(&text),
        None => attributes::hex_form(&atv.value),
    };
    format!("{}={}", attributes::symbol(&atv.oid), value)
}

/// Value of the first attribute of the given type, as text
pub fn first_value(name: &Name, oid: &ObjectIdentifier) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|atv| &atv.oid == oid)
        .and_then(|atv| attributes::text(&atv.value))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(c);
            }
            '#' if i == 0 => out.push_str("\\#"),
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

/// Parse a name written most-specific RDN first, the way [`render`] prints it.
///
/// Whitespace around separators is ignored, `+` joins multi-valued RDNs and
/// a value of the form `#hex` is taken as the DER of the attribute value.
pub fn parse(text: &str) -> Result<Name> {
    let mut rdns = Vec::new();
    for rdn_text in split_unescaped(text, ',') {
        if rdn_text.trim().is_empty() {
            continue;
        }
        let mut atvs = Vec::new();
        for atv_text in split_unescaped(&rdn_text, '+') {
            atvs.push(parse_attribute(&atv_text)?);
        }
        let set = SetOfVec::try_from(atvs)
            .map_err(|e| CertificateError::InvalidName(format!("{rdn_text}: {e}")))?;
        rdns.push(RelativeDistinguishedName(set));
    }
    rdns.reverse();
    Ok(RdnSequence(rdns))
}

fn parse_attribute(text: &str) -> Result<AttributeTypeAndValue> {
    let (key, raw) = text
        .split_once('=')
        .ok_or_else(|| CertificateError::InvalidName(format!("missing '=' in {text:?}")))?;
    let oid = attributes::lookup(key)
        .ok_or_else(|| CertificateError::InvalidName(format!("unknown attribute {key:?}")))?;
    let raw = raw.trim_start();
    let value = if let Some(hex_der) = raw.strip_prefix('#') {
        let der = hex::decode(hex_der.trim())
            .map_err(|e| CertificateError::InvalidName(format!("{key}: {e}")))?;
        <der::asn1::Any as der::Decode>::from_der(&der)?
    } else {
        attributes::encode_text(&oid, &unescape(raw))?
    };
    Ok(AttributeTypeAndValue { oid, value })
}

/// Split on `sep` outside backslash escapes, keeping the escapes in place
fn split_unescaped(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == sep {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);
    parts
}

fn unescape(raw: &str) -> String {
    // Unescaped trailing spaces are insignificant, escaped ones are kept.
    let mut trimmed = raw.trim_end();
    if trimmed.ends_with('\\') && raw.len() > trimmed.len() {
        trimmed = &raw[..trimmed.len() + 1];
    }

    let mut bytes = Vec::with_capacity(trimmed.len());
    let mut chars = trimmed.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let Some(next) = chars.next() else { break };
        let pair = chars
            .peek()
            .filter(|_| next.is_ascii_hexdigit())
            .and_then(|low| u8::from_str_radix(&format!("{next}{low}"), 16).ok());
        match pair {
            Some(byte) => {
                chars.next();
                bytes.push(byte);
            }
            None => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(next.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
