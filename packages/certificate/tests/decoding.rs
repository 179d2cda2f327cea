//! Decoding certificates from bytes, text, files and streams

use certkit_certificate::{
    decode_bytes, decode_chain, decode_file, decode_reader, decode_str, encode_pem,
    subject_common_name, CertificateError,
};
use std::fs;
use std::path::PathBuf;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}

fn read_text(name: &str) -> String {
    fs::read_to_string(resource(name)).unwrap()
}

#[test]
fn test_empty_input_is_no_certificate() {
    assert!(decode_bytes(None).unwrap().is_none());
    assert!(decode_bytes(Some(&[])).unwrap().is_none());
    assert!(decode_str(None).unwrap().is_none());
    assert!(decode_str(Some("")).unwrap().is_none());
    assert!(decode_str(Some(" \n\t ")).unwrap().is_none());
}

#[test]
fn test_decode_der_bytes() {
    let der = fs::read(resource("partya.der")).unwrap();
    let cert = decode_bytes(Some(&der)).unwrap().unwrap();
    assert_eq!(cert.as_der(), der.as_slice());
    assert_eq!(cert.serial_number().as_bytes(), &[0x10, 0x05]);
}

#[test]
fn test_decode_pem_bytes() {
    let pem = fs::read(resource("partya.cert")).unwrap();
    let der = fs::read(resource("partya.der")).unwrap();
    let cert = decode_bytes(Some(&pem)).unwrap().unwrap();
    assert_eq!(cert.as_der(), der.as_slice());
}

#[test]
fn test_decode_non_certificate_bytes() {
    let png = fs::read(resource("image.png")).unwrap();
    let result = decode_bytes(Some(&png));
    assert!(result.is_err());
    match result {
        Err(CertificateError::NoCertificate) => {}
        other => panic!("Expected NoCertificate, got {other:?}"),
    }
}

#[test]
fn test_decode_malformed_der() {
    let mut der = fs::read(resource("partya.der")).unwrap();
    der[20] ^= 0xFF;
    der[21] ^= 0xFF;
    assert!(decode_bytes(Some(&der)).is_err());
}

#[test]
fn test_decode_truncated_der() {
    let der = fs::read(resource("partya.der")).unwrap();
    for cut in [&der[..1], &der[..3], &der[..der.len() - 1]] {
        match decode_bytes(Some(cut)) {
            Err(CertificateError::Parsing(msg)) => assert!(msg.contains("truncated"), "{msg}"),
            other => panic!("Expected Parsing error, got {other:?}"),
        }
    }
}

#[test]
fn test_decode_pem_text() {
    let text = read_text("partya.cert");
    let cert = decode_str(Some(&text)).unwrap().unwrap();
    assert_eq!(
        subject_common_name(&cert).as_deref(),
        Some("partya.examples.holodeck-b2b.com")
    );
}

#[test]
fn test_decode_text_with_prologue_and_epilogue() {
    let text = read_text("partya.cert");
    let reference = decode_str(Some(&text)).unwrap().unwrap();

    let with_header = format!("ignored-header\nSubject: partya\n{text}");
    let with_trailer = format!("{text}trailer-noise\n");

    for input in [with_header, with_trailer] {
        let cert = decode_str(Some(&input)).unwrap().unwrap();
        assert_eq!(cert.serial_number(), reference.serial_number());
        assert_eq!(cert.subject(), reference.subject());
        assert_eq!(cert, reference);
    }
}

#[test]
fn test_decode_pem_without_end_marker() {
    let text = read_text("partya.cert");
    let truncated = text.replace("-----END CERTIFICATE-----", "");
    assert!(decode_str(Some(&truncated)).unwrap().is_some());
}

#[test]
fn test_decode_pem_markers_without_body() {
    for text in [
        "-----BEGIN CERTIFICATE-----",
        "-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----",
        "header\n-----BEGIN CERTIFICATE-----\n  \n-----END CERTIFICATE-----\n",
    ] {
        match decode_str(Some(text)) {
            Err(CertificateError::NoCertificate) => {}
            other => panic!("Expected NoCertificate for {text:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_decode_bare_base64() {
    let wrapped = read_text("partya.b64");
    let joined: String = wrapped.lines().collect();
    let from_wrapped = decode_str(Some(&wrapped)).unwrap().unwrap();
    let from_joined = decode_str(Some(&joined)).unwrap().unwrap();
    assert_eq!(from_wrapped, from_joined);
    assert_eq!(from_wrapped.serial_number().as_bytes(), &[0x10, 0x05]);
}

#[test]
fn test_decode_invalid_base64_text() {
    let result = decode_str(Some("this is certainly not a certificate!"));
    match result {
        Err(CertificateError::InvalidBase64(_)) => {}
        other => panic!("Expected InvalidBase64, got {other:?}"),
    }
}

#[test]
fn test_decode_file() {
    let from_pem = decode_file(Some(resource("partya.cert").as_path())).unwrap();
    let from_der = decode_file(Some(resource("partya.der").as_path())).unwrap();
    assert_eq!(from_pem, from_der);
}

#[test]
fn test_decode_file_requires_path() {
    match decode_file(None) {
        Err(CertificateError::InvalidArgument(_)) => {}
        other => panic!("Expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn test_decode_missing_file() {
    match decode_file(Some(resource("does-not-exist.cert").as_path())) {
        Err(CertificateError::Io(_)) => {}
        other => panic!("Expected Io error, got {other:?}"),
    }
}

#[test]
fn test_decode_file_not_a_certificate() {
    assert!(decode_file(Some(resource("image.png").as_path())).is_err());
}

#[test]
fn test_decode_chain_preserves_order() {
    let file = fs::File::open(resource("partyc-chain.pem")).unwrap();
    let chain = decode_chain(file).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(
        subject_common_name(&chain[0]).as_deref(),
        Some("partyc.examples.certkit.org")
    );
    assert_eq!(
        subject_common_name(&chain[1]).as_deref(),
        Some("ca.examples.certkit.org")
    );
    let leaf = decode_file(Some(resource("partyc.cert").as_path())).unwrap();
    assert_eq!(chain[0], leaf);
}

#[test]
fn test_decode_chain_of_concatenated_der() {
    let partya = fs::read(resource("partya.der")).unwrap();
    let ca = decode_file(Some(resource("ca.cert").as_path())).unwrap();
    let mut stream = ca.as_der().to_vec();
    stream.extend_from_slice(&partya);
    stream.extend_from_slice(ca.as_der());

    let chain = decode_chain(stream.as_slice()).unwrap();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain[0], ca);
    assert_eq!(chain[1].as_der(), partya.as_slice());
    assert_eq!(chain[2], ca);
}

#[test]
fn test_decode_chain_of_nothing() {
    assert!(decode_chain(&b""[..]).unwrap().is_empty());
    assert!(decode_chain(&b"no certificates here\n"[..]).unwrap().is_empty());
}

#[test]
fn test_decode_reader_leaves_rest_of_stream() {
    let chain = read_text("partyc-chain.pem");
    let mut reader = chain.as_bytes();
    let first = decode_reader(&mut reader).unwrap();
    let second = decode_reader(&mut reader).unwrap();
    assert_ne!(first, second);
    assert!(matches!(
        decode_reader(&mut reader),
        Err(CertificateError::NoCertificate)
    ));
}

#[test]
fn test_pem_round_trip() {
    let text = read_text("partya.cert");
    let text = text.trim_end();
    let cert = decode_str(Some(text)).unwrap().unwrap();
    assert_eq!(encode_pem(&cert), text);
    assert_eq!(cert.to_pem(), text);
}

#[test]
fn test_pem_encoding_layout() {
    let cert = decode_file(Some(resource("device.cert").as_path())).unwrap();
    let pem = encode_pem(&cert);
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----\n"));
    assert!(pem.ends_with("\n-----END CERTIFICATE-----"));
    assert!(!pem.contains('\r'));
    for line in pem.lines() {
        assert!(line.len() <= 64);
    }
    let again = decode_str(Some(&pem)).unwrap().unwrap();
    assert_eq!(again, cert);
}
