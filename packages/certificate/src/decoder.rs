//! Stream decoding of DER and PEM certificates
//!
//! A single decoder handles both encodings: input whose first significant
//! byte starts an ASN.1 SEQUENCE is read as one DER certificate, anything
//! else is scanned line by line for a PEM block. Text before the first
//! `-----BEGIN` line is skipped, so comment headers in certificate files
//! are tolerated.

use crate::certificate::Certificate;
use crate::error::{CertificateError, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const SEQUENCE_TAG: u8 = 0x30;
const PEM_BEGIN: &[u8] = b"-----BEGIN";
const PEM_END: &[u8] = b"-----END";

/// Base64 engine that accepts both padded and unpadded bodies
pub(crate) const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

static DECODER: Lazy<CertificateDecoder> = Lazy::new(CertificateDecoder::new);

/// Stateless certificate decoder shared by the whole process.
#[derive(Debug, Default)]
pub struct CertificateDecoder {
    _private: (),
}

impl CertificateDecoder {
    fn new() -> Self {
        tracing::trace!("Initialising shared certificate decoder");
        Self { _private: () }
    }

    /// The process-wide decoder instance
    pub fn shared() -> &'static CertificateDecoder {
        &DECODER
    }

    /// Decode the next certificate from `reader`.
    ///
    /// Returns `Ok(None)` when the input holds no further certificate, and
    /// leaves the reader positioned right after the certificate otherwise.
    pub fn decode<R: BufRead + ?Sized>(&self, reader: &mut R) -> Result<Option<Certificate>> {
        match skip_whitespace(reader)? {
            None => Ok(None),
            Some(SEQUENCE_TAG) => read_der(reader).map(Some),
            Some(_) => read_pem(reader),
        }
    }
}

/// Consume leading ASCII whitespace, returning the first remaining byte
fn skip_whitespace<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<u8>> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let first = buf[pos];
                reader.consume(pos);
                return Ok(Some(first));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

fn read_header<R: BufRead + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            CertificateError::parsing("truncated certificate: incomplete DER header")
        }
        _ => err.into(),
    })
}

fn read_der<R: BufRead + ?Sized>(reader: &mut R) -> Result<Certificate> {
    let mut header = vec![0u8; 2];
    read_header(reader, &mut header)?;

    let content_len = match header[1] {
        short @ 0x00..=0x7F => usize::from(short),
        0x80 => {
            return Err(CertificateError::parsing(
                "indefinite length encoding is not allowed for certificates",
            ))
        }
        long => {
            let octets = usize::from(long & 0x7F);
            if octets > 4 {
                return Err(CertificateError::parsing(format!(
                    "certificate length uses {octets} octets"
                )));
            }
            let mut len_bytes = vec![0u8; octets];
            read_header(reader, &mut len_bytes)?;
            header.extend_from_slice(&len_bytes);
            len_bytes
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | usize::from(*b))
        }
    };

    let mut der = header;
    let read = reader
        .take(content_len as u64)
        .read_to_end(&mut der)?;
    if read < content_len {
        return Err(CertificateError::parsing(format!(
            "truncated certificate: expected {content_len} content bytes, found {read}"
        )));
    }
    Certificate::from_der(der)
}

fn read_pem<R: BufRead + ?Sized>(reader: &mut R) -> Result<Option<Certificate>> {
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            tracing::trace!("No PEM header before end of input");
            return Ok(None);
        }
        if line.trim_ascii_start().starts_with(PEM_BEGIN) {
            break;
        }
    }

    let mut body = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Err(CertificateError::parsing("PEM block has no end marker"));
        }
        let trimmed = line.trim_ascii();
        if trimmed.starts_with(PEM_END) {
            break;
        }
        body.extend(trimmed.iter().filter(|b| !b.is_ascii_whitespace()));
    }

    let der = LENIENT_BASE64.decode(&body)?;
    Certificate::from_der(der).map(Some)
}

/// Decode a certificate from bytes holding DER or PEM.
///
/// `None` and empty input mean "no certificate" and yield `Ok(None)`.
pub fn decode_bytes(bytes: Option<&[u8]>) -> Result<Option<Certificate>> {
    match bytes {
        None | Some([]) => Ok(None),
        Some(mut bytes) => decode_reader(&mut bytes).map(Some),
    }
}

/// Decode exactly one certificate from a reader
pub fn decode_reader<R: BufRead + ?Sized>(reader: &mut R) -> Result<Certificate> {
    CertificateDecoder::shared()
        .decode(reader)?
        .ok_or(CertificateError::NoCertificate)
}

/// Decode a certificate from a file holding DER, PEM or PEM with a prologue.
pub fn decode_file(path: Option<&Path>) -> Result<Certificate> {
    let path = path.ok_or_else(|| CertificateError::invalid_argument("path is required"))?;
    let file = File::open(path)?;
    let cert = decode_reader(&mut BufReader::new(file))?;
    tracing::debug!(path = %path.display(), "Decoded certificate from file");
    Ok(cert)
}

/// Decode every certificate in the stream, in the order they appear.
///
/// Concatenated PEM blocks and back-to-back DER certificates are both
/// accepted. Input without any certificate yields an empty chain.
pub fn decode_chain<R: Read>(reader: R) -> Result<Vec<Certificate>> {
    let mut reader = BufReader::new(reader);
    let decoder = CertificateDecoder::shared();
    let mut chain = Vec::new();
    while let Some(cert) = decoder.decode(&mut reader)? {
        chain.push(cert);
    }
    tracing::debug!(length = chain.len(), "Decoded certificate chain");
    Ok(chain)
}
