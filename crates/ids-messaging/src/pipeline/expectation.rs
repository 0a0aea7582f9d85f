//! # Payload Expectations
//!
//! Type-level description of what a caller expects in the response payload.
//! The chosen expectation fixes the payload type of the returned
//! [`MessageContainer`](crate::domain::MessageContainer).

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// How to turn raw response payload bytes into a typed value.
pub trait PayloadExpectation: Send + 'static {
    /// Payload type of the resulting container.
    type Output: Send;

    /// Name reported in `UnexpectedPayload` errors.
    const NAME: &'static str;

    /// Whether a rejection response can never satisfy this expectation.
    const TYPED: bool = true;

    /// Convert the payload, or explain why it does not match.
    fn extract(payload: Option<&Bytes>) -> Result<Option<Self::Output>, String>;
}

/// Raw bytes, no check. The default.
#[derive(Debug)]
pub struct Raw;

impl PayloadExpectation for Raw {
    type Output = Bytes;
    const NAME: &'static str = "bytes";
    const TYPED: bool = false;

    fn extract(payload: Option<&Bytes>) -> Result<Option<Bytes>, String> {
        Ok(payload.cloned())
    }
}

/// A UTF-8 string.
#[derive(Debug)]
pub struct Text;

impl PayloadExpectation for Text {
    type Output = String;
    const NAME: &'static str = "text";

    fn extract(payload: Option<&Bytes>) -> Result<Option<String>, String> {
        let payload = payload.ok_or_else(|| "response has no payload".to_string())?;
        String::from_utf8(payload.to_vec())
            .map(Some)
            .map_err(|e| e.to_string())
    }
}

/// A JSON document deserialized into `T`.
pub struct Json<T>(PhantomData<fn() -> T>);

impl<T> PayloadExpectation for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = T;
    const NAME: &'static str = "json";

    fn extract(payload: Option<&Bytes>) -> Result<Option<T>, String> {
        let payload = payload.ok_or_else(|| "response has no payload".to_string())?;
        serde_json::from_slice(payload)
            .map(Some)
            .map_err(|e| e.to_string())
    }
}
