//! Payload codecs.
//!
//! Requesters and responders are generic over a [`Codec`] per direction, so
//! the message types and their wire encoding are chosen at construction.

use std::any::type_name;
use std::borrow::Cow;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;

/// Encode/decode capability for one message type.
pub trait Codec {
    type Message;

    /// Human-readable name of the message type, used in logs and errors.
    fn type_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(type_name::<Self::Message>())
    }

    fn encode(&self, message: &Self::Message) -> Result<Vec<u8>, CodecError>;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Message, CodecError>;
}

/// Compact binary encoding via bitcode's serde support.
///
/// ```
/// use sourced_rpc::{BitcodeCodec, Codec};
///
/// let codec = BitcodeCodec::<(String, u32)>::new();
/// let bytes = codec.encode(&("exposure".to_string(), 3000)).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap(), ("exposure".to_string(), 3000));
/// ```
pub struct BitcodeCodec<T> {
    _message: PhantomData<fn() -> T>,
}

impl<T> BitcodeCodec<T> {
    pub fn new() -> Self {
        Self {
            _message: PhantomData,
        }
    }
}

impl<T> Default for BitcodeCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BitcodeCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec for BitcodeCodec<T> {
    type Message = T;

    fn encode(&self, message: &T) -> Result<Vec<u8>, CodecError> {
        bitcode::serialize(message).map_err(|e| CodecError::Encode {
            type_name: self.type_name().into_owned(),
            message: e.to_string(),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        bitcode::deserialize(bytes).map_err(|e| CodecError::Decode {
            type_name: self.type_name().into_owned(),
            message: e.to_string(),
        })
    }
}

/// JSON encoding, readable on the wire. Requires the `json` feature.
#[cfg(feature = "json")]
pub struct JsonCodec<T> {
    _message: PhantomData<fn() -> T>,
}

#[cfg(feature = "json")]
impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _message: PhantomData,
        }
    }
}

#[cfg(feature = "json")]
impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "json")]
impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

#[cfg(feature = "json")]
impl<T: Serialize + DeserializeOwned> Codec for JsonCodec<T> {
    type Message = T;

    fn encode(&self, message: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(message).map_err(|e| CodecError::Encode {
            type_name: self.type_name().into_owned(),
            message: e.to_string(),
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            type_name: self.type_name().into_owned(),
            message: e.to_string(),
        })
    }
}
