//! Codec trait and the JSON implementation.
//!
//! The server never serializes wire types directly; it goes through a
//! [`Codec`] so the transport can pick the format. Only JSON exists today.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ActionRequest, ProtocolError};

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// request handler for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Decodes an action request and checks it names an action.
    fn decode_action(&self, data: &[u8]) -> Result<ActionRequest, ProtocolError> {
        let request: ActionRequest = self.decode(data)?;
        if request.action.trim().is_empty() {
            return Err(ProtocolError::InvalidMessage(
                "action name must not be empty".into(),
            ));
        }
        Ok(request)
    }
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use boredgames_protocol::{ActionRequest, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let request = ActionRequest { action: "draw".into(), args: None };
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded = codec.decode_action(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
