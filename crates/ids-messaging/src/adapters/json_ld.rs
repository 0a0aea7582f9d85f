//! JSON-LD header codec backed by `serde_json`.

use crate::domain::SchemaError;
use crate::ports::SchemaCodec;
use bytes::Bytes;
use ids_types::MessageHeader;

/// Reads and writes [`MessageHeader`] as compact JSON-LD.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLdSchemaCodec;

impl JsonLdSchemaCodec {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaCodec for JsonLdSchemaCodec {
    fn parse_header(&self, bytes: &[u8]) -> Result<MessageHeader, SchemaError> {
        serde_json::from_slice(bytes).map_err(|e| SchemaError::InvalidHeader(e.to_string()))
    }

    fn serialize_header(&self, header: &MessageHeader) -> Result<Bytes, SchemaError> {
        serde_json::to_vec(header)
            .map(Bytes::from)
            .map_err(|e| SchemaError::Serialization(e.to_string()))
    }
}
