//! Identity attributes and matching predicates

use crate::certificate::Certificate;
use crate::name::{self, attributes};
use const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER;
use der::Encode;
use digest::DynDigest;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;

/// Length of the OCTET STRING headers around a subject key identifier
const SKI_HEADER_LEN: usize = 4;

/// Common name of the subject
pub fn subject_common_name(cert: &Certificate) -> Option<String> {
    name::first_value(cert.subject(), &attributes::COMMON_NAME)
}

/// Common name of the issuer
pub fn issuer_common_name(cert: &Certificate) -> Option<String> {
    name::first_value(cert.issuer(), &attributes::COMMON_NAME)
}

/// The `serialNumber` attribute of the subject name.
///
/// This is an identity attribute of the subject, not the serial number of
/// the certificate itself.
pub fn subject_serial_number(cert: &Certificate) -> Option<String> {
    name::first_value(cert.subject(), &attributes::SERIAL_NUMBER)
}

/// Subject name, most specific RDN first
pub fn subject_name(cert: &Certificate) -> String {
    name::render(cert.subject())
}

/// Issuer name, most specific RDN first
pub fn issuer_name(cert: &Certificate) -> String {
    name::render(cert.issuer())
}

/// Whether the certificate has a subject key identifier equal to `expected`.
pub fn has_subject_key_identifier(cert: &Certificate, expected: &[u8]) -> bool {
    let Some(ext) = cert.extension(&ID_CE_SUBJECT_KEY_IDENTIFIER) else {
        return false;
    };
    // extnValue wraps the identifier's own OCTET STRING in a second one
    match ext.extn_value.to_der() {
        Ok(encoded) => encoded.get(SKI_HEADER_LEN..) == Some(expected),
        Err(_) => false,
    }
}

/// Whether the certificate was issued by `issuer` under `serial`.
///
/// Names compare with principal equality, see [`name::names_match`].
pub fn has_issuer_and_serial(cert: &Certificate, issuer: &Name, serial: &SerialNumber) -> bool {
    name::names_match(cert.issuer(), issuer)
        && minimal_integer(cert.serial_number().as_bytes()) == minimal_integer(serial.as_bytes())
}

/// Whether the digest of the certificate's DER equals `expected`.
///
/// The digest is reset before use, so a partially fed instance is fine.
pub fn has_thumbprint(cert: &Certificate, expected: &[u8], digest: &mut dyn DynDigest) -> bool {
    digest.reset();
    digest.update(cert.as_der());
    *digest.finalize_reset() == *expected
}

/// Strip redundant sign octets from a two's complement integer
fn minimal_integer(mut bytes: &[u8]) -> &[u8] {
    while let [first, second, ..] = bytes {
        let redundant = (*first == 0x00 && second & 0x80 == 0) || (*first == 0xFF && second & 0x80 != 0);
        if !redundant {
            break;
        }
        bytes = &bytes[1..];
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::minimal_integer;

    #[test]
    fn sign_octets_are_normalised() {
        assert_eq!(minimal_integer(&[0x00, 0x00, 0x10, 0x05]), &[0x10, 0x05]);
        assert_eq!(minimal_integer(&[0x00, 0x80]), &[0x00, 0x80]);
        assert_eq!(minimal_integer(&[0xFF, 0xFF, 0x80]), &[0x80]);
        assert_eq!(minimal_integer(&[0x05]), &[0x05]);
    }
}
