//! Property tests for the text decoding paths

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use certkit_certificate::{decode_str, encode_pem, Certificate};
use proptest::prelude::*;
use std::path::PathBuf;

fn partya() -> Certificate {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/partya.der");
    Certificate::from_der(std::fs::read(path).unwrap()).unwrap()
}

fn wrap(text: &str, width: usize, line_end: &str) -> String {
    text.as_bytes()
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(line_end)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bare_base64_ignores_line_wrapping(
        width in 1usize..200,
        crlf in any::<bool>(),
    ) {
        let cert = partya();
        let body = STANDARD.encode(cert.as_der());
        let wrapped = wrap(&body, width, if crlf { "\r\n" } else { "\n" });

        let decoded = decode_str(Some(&wrapped)).unwrap().unwrap();
        prop_assert_eq!(decoded, cert);
    }

    #[test]
    fn pem_survives_surrounding_text(
        prologue in "[a-zA-Z0-9 :#]{0,40}",
        epilogue in "[a-zA-Z0-9 :#]{0,40}",
    ) {
        let cert = partya();
        let text = format!("{prologue}\n{}\n{epilogue}", encode_pem(&cert));

        let decoded = decode_str(Some(&text)).unwrap().unwrap();
        prop_assert_eq!(decoded.serial_number(), cert.serial_number());
        prop_assert_eq!(decoded.subject(), cert.subject());
    }
}
