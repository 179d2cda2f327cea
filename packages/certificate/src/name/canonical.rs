use super::attributes;
use der::Encode;
use x509_cert::name::Name;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Value {
    Text(String),
    Der(Vec<u8>),
}

type Rdn = Vec<(Vec<u8>, Value)>;

/// Principal equality of two names.
///
/// String values compare case-insensitively with surrounding whitespace
/// removed and inner whitespace runs collapsed, independent of the ASN.1
/// string type they were encoded with. Multi-valued RDNs compare as sets.
pub fn names_match(a: &Name, b: &Name) -> bool {
    a.0.len() == b.0.len() && canonical(a) == canonical(b)
}

fn canonical(name: &Name) -> Vec<Rdn> {
    name.0
        .iter()
        .map(|rdn| {
            let mut atvs: Rdn = rdn
                .0
                .iter()
                .map(|atv| {
                    let value = match attributes::text(&atv.value) {
                        Some(text) => Value::Text(fold(&text)),
                        None => Value::Der(atv.value.to_der().unwrap_or_default()),
                    };
                    (atv.oid.as_bytes().to_vec(), value)
                })
                .collect();
            atvs.sort();
            atvs
        })
        .collect()
}

fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
