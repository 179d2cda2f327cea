//! Attribute type symbols and directory string values

use const_oid::ObjectIdentifier;
use der::asn1::{
    Any, BmpString, Ia5StringRef, PrintableStringRef, TeletexStringRef, Utf8StringRef,
};
use der::{Encode, Tag, Tagged};

/// commonName
pub const COMMON_NAME: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
/// serialNumber attribute of a name (not the certificate serial)
pub const SERIAL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
/// countryName
pub const COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
/// dnQualifier
pub const DN_QUALIFIER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.46");
/// emailAddress (PKCS#9)
pub const EMAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");
/// domainComponent
pub const DOMAIN_COMPONENT: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");

/// Short names used when rendering and parsing distinguished names.
const SYMBOLS: &[(&str, ObjectIdentifier)] = &[
    ("CN", COMMON_NAME),
    ("C", COUNTRY),
    ("O", ObjectIdentifier::new_unwrap("2.5.4.10")),
    ("OU", ObjectIdentifier::new_unwrap("2.5.4.11")),
    ("L", ObjectIdentifier::new_unwrap("2.5.4.7")),
    ("ST", ObjectIdentifier::new_unwrap("2.5.4.8")),
    ("STREET", ObjectIdentifier::new_unwrap("2.5.4.9")),
    ("SERIALNUMBER", SERIAL_NUMBER),
    ("T", ObjectIdentifier::new_unwrap("2.5.4.12")),
    ("SURNAME", ObjectIdentifier::new_unwrap("2.5.4.4")),
    ("GIVENNAME", ObjectIdentifier::new_unwrap("2.5.4.42")),
    ("INITIALS", ObjectIdentifier::new_unwrap("2.5.4.43")),
    ("GENERATION", ObjectIdentifier::new_unwrap("2.5.4.44")),
    ("DNQUALIFIER", DN_QUALIFIER),
    ("PSEUDONYM", ObjectIdentifier::new_unwrap("2.5.4.65")),
    ("BUSINESSCATEGORY", ObjectIdentifier::new_unwrap("2.5.4.15")),
    ("POSTALCODE", ObjectIdentifier::new_unwrap("2.5.4.17")),
    ("NAME", ObjectIdentifier::new_unwrap("2.5.4.41")),
    ("ORGANIZATIONIDENTIFIER", ObjectIdentifier::new_unwrap("2.5.4.97")),
    ("E", EMAIL_ADDRESS),
    ("DC", DOMAIN_COMPONENT),
    ("UID", ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.1")),
];

/// Display symbol of an attribute type, or its dotted form when unknown
pub fn symbol(oid: &ObjectIdentifier) -> String {
    SYMBOLS
        .iter()
        .find(|(_, known)| known == oid)
        .map(|(name, _)| (*name).to_string())
        .unwrap_or_else(|| oid.to_string())
}

/// Resolve a symbol (case-insensitive) or dotted OID to an attribute type
pub fn lookup(key: &str) -> Option<ObjectIdentifier> {
    let key = key.trim();
    let key = key
        .strip_prefix("OID.")
        .or_else(|| key.strip_prefix("oid."))
        .unwrap_or(key);
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        return ObjectIdentifier::new(key).ok();
    }
    SYMBOLS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, oid)| *oid)
}

/// Text of a directory string value, `None` for non-string values
pub fn text(value: &Any) -> Option<String> {
    if let Ok(s) = Utf8StringRef::try_from(value) {
        Some(s.to_string())
    } else if let Ok(s) = PrintableStringRef::try_from(value) {
        Some(s.to_string())
    } else if let Ok(s) = Ia5StringRef::try_from(value) {
        Some(s.to_string())
    } else if let Ok(s) = TeletexStringRef::try_from(value) {
        Some(s.to_string())
    } else if value.tag() == Tag::BmpString {
        value
            .decode_as::<BmpString>()
            .ok()
            .map(|s| s.to_string())
    } else {
        None
    }
}

/// `#` followed by the hex DER of a value, the form used for non-string values
pub fn hex_form(value: &Any) -> String {
    match value.to_der() {
        Ok(der) => format!("#{}", hex::encode(der)),
        Err(_) => String::from("#"),
    }
}

/// Encode text as the string type conventionally used for an attribute
pub fn encode_text(oid: &ObjectIdentifier, text: &str) -> der::Result<Any> {
    if *oid == EMAIL_ADDRESS || *oid == DOMAIN_COMPONENT {
        if let Ok(s) = Ia5StringRef::new(text) {
            return Any::encode_from(&s);
        }
    }
    if *oid == COUNTRY || *oid == SERIAL_NUMBER || *oid == DN_QUALIFIER {
        if let Ok(s) = PrintableStringRef::new(text) {
            return Any::encode_from(&s);
        }
    }
    Any::encode_from(&Utf8StringRef::new(text)?)
}
