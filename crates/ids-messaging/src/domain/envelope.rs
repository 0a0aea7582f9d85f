//! # Multipart Envelope
//!
//! The header + payload pair carried by every request and response body.
//! Part order on the wire is always `header` then `payload`.

use crate::domain::errors::MultipartError;
use bytes::Bytes;
use std::fmt;

/// The fixed set of part names understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartName {
    /// JSON-LD message header.
    Header,
    /// Opaque payload.
    Payload,
}

impl PartName {
    /// Name as it appears in `Content-Disposition`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PartName::Header => "header",
            PartName::Payload => "payload",
        }
    }

    /// Media type emitted for this part.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            PartName::Header => "application/ld+json",
            PartName::Payload => "application/octet-stream",
        }
    }

    /// Look up a part by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "header" => Some(PartName::Header),
            "payload" => Some(PartName::Payload),
            _ => None,
        }
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered mapping from part name to raw bytes.
///
/// The codec itself does not require a header part; callers that need one
/// check [`MultipartEnvelope::header`] explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartEnvelope {
    header: Option<Bytes>,
    payload: Option<Bytes>,
}

impl MultipartEnvelope {
    /// Envelope with a header part only.
    pub fn new(header: impl Into<Bytes>) -> Self {
        Self {
            header: Some(header.into()),
            payload: None,
        }
    }

    /// Envelope with a payload part only.
    pub fn payload_only(payload: impl Into<Bytes>) -> Self {
        Self {
            header: None,
            payload: Some(payload.into()),
        }
    }

    /// Attach a payload part.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attach a payload part if one is given.
    #[must_use]
    pub fn with_optional_payload(mut self, payload: Option<Bytes>) -> Self {
        self.payload = payload;
        self
    }

    /// The header part, if present.
    #[must_use]
    pub fn header(&self) -> Option<&Bytes> {
        self.header.as_ref()
    }

    /// The payload part, if present.
    #[must_use]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Number of parts present.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.header.is_some()) + usize::from(self.payload.is_some())
    }

    /// Whether no part is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Present parts in wire order.
    pub fn parts(&self) -> impl Iterator<Item = (PartName, &Bytes)> {
        [
            (PartName::Header, self.header.as_ref()),
            (PartName::Payload, self.payload.as_ref()),
        ]
        .into_iter()
        .filter_map(|(name, content)| content.map(|c| (name, c)))
    }

    /// Split into `(header, payload)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<Bytes>, Option<Bytes>) {
        (self.header, self.payload)
    }

    /// Store a decoded part, refusing duplicates.
    pub(crate) fn insert(&mut self, name: PartName, content: Bytes) -> Result<(), MultipartError> {
        let slot = match name {
            PartName::Header => &mut self.header,
            PartName::Payload => &mut self.payload,
        };
        if slot.is_some() {
            return Err(MultipartError::DuplicatePart(name.as_str()));
        }
        *slot = Some(content);
        Ok(())
    }
}

/// An encoded body together with the boundary that delimits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEnvelope {
    /// Boundary token used between parts.
    pub boundary: String,
    /// Encoded body.
    pub body: Bytes,
}

impl EncodedEnvelope {
    /// `Content-Type` value announcing this body.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}
