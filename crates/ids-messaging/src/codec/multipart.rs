//! # Multipart Codec
//!
//! Encodes and decodes the header + payload envelope:
//!
//! ```text
//! --<boundary>
//! Content-Disposition: form-data; name="header"
//! Content-Type: application/ld+json
//!
//! <JSON-LD message header>
//! --<boundary>
//! Content-Disposition: form-data; name="payload"
//! Content-Type: application/octet-stream
//!
//! <opaque payload bytes>
//! --<boundary>--
//! ```
//!
//! ## Decoding Rules
//!
//! - The boundary is taken from the first line starting with `--`; anything
//!   before it is preamble.
//! - A delimiter only counts at the start of a line and when followed by a
//!   line break, whitespace, `--` or the end of input, so part bodies may
//!   contain arbitrary bytes including CR, LF, quotes and dashes.
//! - Unknown part names are skipped; duplicated known names are an error.
//!   An envelope holding only unknown parts decodes to an empty envelope;
//!   whether `header` is required is the caller's decision.

use crate::domain::{EncodedEnvelope, MultipartEnvelope, MultipartError, PartName};
use bytes::{BufMut, Bytes, BytesMut};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

/// Default length of generated boundary tokens.
pub const DEFAULT_BOUNDARY_LENGTH: usize = 32;

const CRLF: &[u8] = b"\r\n";
const DASHES: &[u8] = b"--";

/// Stateless multipart encoder/decoder.
#[derive(Debug, Clone, Copy)]
pub struct MultipartCodec {
    boundary_length: usize,
}

impl Default for MultipartCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartCodec {
    /// Codec generating boundaries of [`DEFAULT_BOUNDARY_LENGTH`] characters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary_length: DEFAULT_BOUNDARY_LENGTH,
        }
    }

    /// Codec generating boundaries of the given length (clamped to 8..=70).
    #[must_use]
    pub fn with_boundary_length(length: usize) -> Self {
        Self {
            boundary_length: length.clamp(8, 70),
        }
    }

    /// Encode an envelope under a fresh random boundary that occurs in no part.
    ///
    /// # Errors
    ///
    /// * `MultipartError::EmptyEnvelope` - the envelope has no parts
    pub fn encode(&self, envelope: &MultipartEnvelope) -> Result<EncodedEnvelope, MultipartError> {
        if envelope.is_empty() {
            return Err(MultipartError::EmptyEnvelope);
        }

        let boundary = loop {
            let candidate = random_boundary(self.boundary_length);
            if !envelope
                .parts()
                .any(|(_, content)| contains(content, candidate.as_bytes()))
            {
                break candidate;
            }
        };

        let body = write_parts(envelope, &boundary);
        Ok(EncodedEnvelope { boundary, body })
    }

    /// Decode a multipart body.
    ///
    /// # Errors
    ///
    /// * `MultipartError::NoBoundary` - no `--<boundary>` line
    /// * `MultipartError::NoParts` - boundary present but no part follows
    /// * `MultipartError::MalformedPartHeader` - a part lacks a blank line or a name
    /// * `MultipartError::DuplicatePart` - a known part occurs twice
    /// * `MultipartError::MissingClosingBoundary` - parts without the final delimiter
    pub fn decode(&self, body: &[u8]) -> Result<MultipartEnvelope, MultipartError> {
        let (boundary, mut cursor) = find_opening_boundary(body).ok_or(MultipartError::NoBoundary)?;
        let delimiter = [DASHES, boundary].concat();

        let mut envelope = MultipartEnvelope::default();
        let mut parts_read = 0usize;

        loop {
            let rest = &body[cursor..];
            let Some((content_end, delimiter_start)) = find_delimiter(rest, &delimiter) else {
                return Err(if parts_read == 0 {
                    MultipartError::NoParts
                } else {
                    MultipartError::MissingClosingBoundary
                });
            };

            let after_delimiter = cursor + delimiter_start + delimiter.len();
            let closes = body[after_delimiter..].starts_with(DASHES);

            if delimiter_start == 0 {
                // Delimiter directly after the previous one: nothing between them.
                if closes && parts_read == 0 {
                    return Err(MultipartError::NoParts);
                }
                return Err(MultipartError::MalformedPartHeader(
                    "empty part".to_string(),
                ));
            }

            let (name, content) = parse_part(&rest[..content_end])?;
            match PartName::from_name(&name) {
                Some(part) => envelope.insert(part, Bytes::copy_from_slice(content))?,
                None => debug!(part = %name, "Skipping unknown multipart part"),
            }
            parts_read += 1;

            if closes {
                break;
            }
            cursor = skip_to_next_line(body, after_delimiter).ok_or(MultipartError::MissingClosingBoundary)?;
        }

        Ok(envelope)
    }
}

fn random_boundary(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn write_parts(envelope: &MultipartEnvelope, boundary: &str) -> Bytes {
    let capacity = envelope
        .parts()
        .map(|(_, content)| content.len() + boundary.len() + 128)
        .sum::<usize>()
        + boundary.len()
        + 8;
    let mut body = BytesMut::with_capacity(capacity);

    for (name, content) in envelope.parts() {
        body.put_slice(DASHES);
        body.put_slice(boundary.as_bytes());
        body.put_slice(CRLF);
        body.put_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                name.as_str(),
                name.content_type()
            )
            .as_bytes(),
        );
        body.put_slice(content);
        body.put_slice(CRLF);
    }

    body.put_slice(DASHES);
    body.put_slice(boundary.as_bytes());
    body.put_slice(DASHES);
    body.put_slice(CRLF);
    body.freeze()
}

/// Locate the first `--<boundary>` line. Returns the boundary and the offset
/// of the line following it.
fn find_opening_boundary(body: &[u8]) -> Option<(&[u8], usize)> {
    let mut line_start = 0;
    while line_start < body.len() {
        let line_end = find_byte(&body[line_start..], b'\n').map(|i| line_start + i);
        let line = &body[line_start..line_end.unwrap_or(body.len())];

        if let Some(candidate) = line.strip_prefix(DASHES) {
            let boundary = trim_trailing_whitespace(candidate);
            if !boundary.is_empty() && !boundary.iter().any(u8::is_ascii_whitespace) {
                return Some((boundary, line_end.map_or(body.len(), |i| i + 1)));
            }
        }

        line_start = match line_end {
            Some(i) => i + 1,
            None => break,
        };
    }
    None
}

/// Find the next delimiter line in `rest`. Returns the end of the preceding
/// part content (line break excluded) and the offset of the delimiter.
fn find_delimiter(rest: &[u8], delimiter: &[u8]) -> Option<(usize, usize)> {
    if rest.starts_with(delimiter) && is_delimiter_end(&rest[delimiter.len()..]) {
        return Some((0, 0));
    }

    let mut from = 1;
    while from < rest.len() {
        let at = from + find_subslice(&rest[from..], delimiter)?;
        if rest[at - 1] == b'\n' && is_delimiter_end(&rest[at + delimiter.len()..]) {
            let content_end = if at >= 2 && rest[at - 2] == b'\r' {
                at - 2
            } else {
                at - 1
            };
            return Some((content_end, at));
        }
        from = at + 1;
    }
    None
}

fn is_delimiter_end(after: &[u8]) -> bool {
    match after.first() {
        None => true,
        Some(b'\r' | b'\n' | b' ' | b'\t') => true,
        Some(b'-') => after.starts_with(DASHES),
        Some(_) => false,
    }
}

/// Skip transport padding and the line break after a delimiter.
fn skip_to_next_line(body: &[u8], from: usize) -> Option<usize> {
    find_byte(&body[from..], b'\n').map(|i| from + i + 1)
}

/// Split a raw part into its `name` and content.
fn parse_part(raw: &[u8]) -> Result<(String, &[u8]), MultipartError> {
    let mut line_start = 0;
    let mut name = None;

    loop {
        let Some(offset) = find_byte(&raw[line_start..], b'\n') else {
            return Err(MultipartError::MalformedPartHeader(
                "missing blank line after part headers".to_string(),
            ));
        };
        let line_end = line_start + offset;
        let line = trim_trailing_cr(&raw[line_start..line_end]);

        if line.is_empty() {
            let name = name.ok_or_else(|| {
                MultipartError::MalformedPartHeader("missing part name".to_string())
            })?;
            return Ok((name, &raw[line_end + 1..]));
        }

        let text = String::from_utf8_lossy(line);
        if let Some((field, value)) = text.split_once(':') {
            if field.trim().eq_ignore_ascii_case("content-disposition") {
                name = disposition_name(value);
            }
        } else {
            return Err(MultipartError::MalformedPartHeader(format!(
                "invalid header line: {}",
                text.trim()
            )));
        }

        line_start = line_end + 1;
    }
}

/// Extract `name` from a `Content-Disposition` value.
fn disposition_name(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("name") {
            return None;
        }
        let val = val.trim();
        let val = val
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(val);
        (!val.is_empty()).then(|| val.to_string())
    })
}

fn trim_trailing_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn trim_trailing_whitespace(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., last] = bytes {
        if last.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}

fn find_byte(haystack: &[u8], needle: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == needle)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find_subslice(haystack, needle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> MultipartCodec {
        MultipartCodec::new()
    }

    #[test]
    fn test_encode_decode_header_and_payload() {
        let envelope = MultipartEnvelope::new(r#"{"@type":"ids:QueryMessage"}"#)
            .with_payload("SELECT * WHERE { ?s ?p ?o }");
        let encoded = codec().encode(&envelope).unwrap();
        assert_eq!(codec().decode(&encoded.body).unwrap(), envelope);
    }

    #[test]
    fn test_encoded_layout() {
        let envelope = MultipartEnvelope::new("{}");
        let encoded = codec().encode(&envelope).unwrap();
        let text = String::from_utf8(encoded.body.to_vec()).unwrap();
        let b = &encoded.boundary;
        assert_eq!(
            text,
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"header\"\r\nContent-Type: application/ld+json\r\n\r\n{{}}\r\n--{b}--\r\n"
            )
        );
    }

    #[test]
    fn test_boundaries_are_random() {
        let envelope = MultipartEnvelope::new("{}");
        let a = codec().encode(&envelope).unwrap();
        let b = codec().encode(&envelope).unwrap();
        assert_ne!(a.boundary, b.boundary);
        assert_eq!(a.boundary.len(), DEFAULT_BOUNDARY_LENGTH);
    }

    #[test]
    fn test_encode_empty_envelope_fails() {
        assert_eq!(
            codec().encode(&MultipartEnvelope::default()),
            Err(MultipartError::EmptyEnvelope)
        );
    }

    #[test]
    fn test_payload_with_boundary_adjacent_bytes() {
        let payload: &[u8] = b"line\r\n--\r\n\"quoted\"\n--not-a-boundary\r\n\r\n\x00\xff--";
        let envelope = MultipartEnvelope::new("{}").with_payload(Bytes::from_static(payload));
        let encoded = codec().encode(&envelope).unwrap();
        let decoded = codec().decode(&encoded.body).unwrap();
        assert_eq!(decoded.payload().map(|p| p.as_ref()), Some(payload));
    }

    #[test]
    fn test_payload_containing_boundary_prefix_is_not_split() {
        let body = b"--abc\r\n\
Content-Disposition: form-data; name=\"header\"\r\n\r\n\
{}\r\n\
--abc\r\n\
Content-Disposition: form-data; name=\"payload\"\r\n\r\n\
x\r\n--abcdef\r\ny\r\n\
--abc--\r\n";
        let decoded = codec().decode(body).unwrap();
        assert_eq!(
            decoded.payload().map(|p| p.as_ref()),
            Some(&b"x\r\n--abcdef\r\ny"[..])
        );
    }

    #[test]
    fn test_decode_not_multipart() {
        assert_eq!(
            codec().decode(b"This is not Multipart."),
            Err(MultipartError::NoBoundary)
        );
    }

    #[test]
    fn test_decode_only_unknown_parts_is_empty_envelope() {
        let body = b"--b0\r\nContent-Disposition: form-data; name=\"extra\"\r\n\r\nignored\r\n--b0--\r\n";
        let decoded = codec().decode(body).unwrap();
        assert!(decoded.header().is_none());
        assert!(decoded.payload().is_none());
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_payload_without_header_is_not_an_encoding_error() {
        let body = b"--b0\r\nContent-Disposition: form-data; name=\"payload\"\r\n\r\ndata\r\n--b0--\r\n";
        let decoded = codec().decode(body).unwrap();
        assert!(decoded.header().is_none());
        assert_eq!(decoded.payload().map(|p| p.as_ref()), Some(&b"data"[..]));
    }

    #[test]
    fn test_decode_boundary_without_parts() {
        assert_eq!(
            codec().decode(b"--boundary\r\nThis is not Multipart."),
            Err(MultipartError::NoParts)
        );
        assert_eq!(
            codec().decode(b"--boundary\r\n--boundary--\r\n"),
            Err(MultipartError::NoParts)
        );
    }

    #[test]
    fn test_decode_missing_name() {
        let body = b"--b0\r\nContent-Disposition: form-data\r\n\r\n{}\r\n--b0--\r\n";
        assert!(matches!(
            codec().decode(body),
            Err(MultipartError::MalformedPartHeader(_))
        ));
    }

    #[test]
    fn test_decode_missing_blank_line() {
        let body = b"--b0\r\nContent-Disposition: form-data; name=\"header\"\r\n--b0--\r\n";
        assert!(matches!(
            codec().decode(body),
            Err(MultipartError::MalformedPartHeader(_))
        ));
    }

    #[test]
    fn test_decode_missing_closing_boundary() {
        let body = b"--b0\r\nContent-Disposition: form-data; name=\"header\"\r\n\r\n{}\r\n--b0\r\nContent-Disposition: form-data; name=\"payload\"\r\n\r\ntruncated";
        assert_eq!(
            codec().decode(body),
            Err(MultipartError::MissingClosingBoundary)
        );
    }

    #[test]
    fn test_decode_duplicate_part() {
        let body = b"--b0\r\nContent-Disposition: form-data; name=header\r\n\r\n{}\r\n--b0\r\nContent-Disposition: form-data; name=header\r\n\r\n{}\r\n--b0--\r\n";
        assert_eq!(
            codec().decode(body),
            Err(MultipartError::DuplicatePart("header"))
        );
    }

    #[test]
    fn test_decode_tolerates_lf_preamble_and_unknown_parts() {
        let body = b"preamble text\n--b0\nContent-Disposition: form-data; name=\"header\"\n\n{}\n--b0\nContent-Disposition: form-data; name=\"extra\"\n\nignored\n--b0\nContent-Disposition: form-data; name=\"payload\"; filename=\"p.bin\"\n\ndata\n--b0--";
        let decoded = codec().decode(body).unwrap();
        assert_eq!(decoded.header().map(|h| h.as_ref()), Some(&b"{}"[..]));
        assert_eq!(decoded.payload().map(|p| p.as_ref()), Some(&b"data"[..]));
    }

    #[test]
    fn test_decode_header_absence_is_not_an_error() {
        let envelope = MultipartEnvelope::payload_only("only payload");
        let encoded = codec().encode(&envelope).unwrap();
        let decoded = codec().decode(&encoded.body).unwrap();
        assert!(decoded.header().is_none());
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn test_empty_part_content_round_trips() {
        let envelope = MultipartEnvelope::new("{}").with_payload(Bytes::new());
        let encoded = codec().encode(&envelope).unwrap();
        assert_eq!(codec().decode(&encoded.body).unwrap(), envelope);
    }

    #[test]
    fn test_boundary_length_is_clamped() {
        let encoded = MultipartCodec::with_boundary_length(2)
            .encode(&MultipartEnvelope::new("{}"))
            .unwrap();
        assert_eq!(encoded.boundary.len(), 8);
    }

    proptest! {
        #[test]
        fn proptest_round_trip_arbitrary_bytes(
            header in prop::option::of(prop::collection::vec(any::<u8>(), 0..512)),
            payload in prop::collection::vec(any::<u8>(), 0..2048),
            include_payload in any::<bool>(),
        ) {
            let mut envelope = match header {
                Some(h) => MultipartEnvelope::new(h),
                None => MultipartEnvelope::payload_only(payload.clone()),
            };
            if include_payload {
                envelope = envelope.with_payload(payload);
            }

            let encoded = MultipartCodec::new().encode(&envelope).unwrap();
            let decoded = MultipartCodec::new().decode(&encoded.body).unwrap();
            prop_assert_eq!(decoded, envelope);
        }
    }
}
