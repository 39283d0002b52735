use thiserror::Error;

use crate::transport::{ReaderId, WriterId};

/// Errors raised by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("topic {topic} is registered with type {registered}, cannot use it with type {requested}")]
    TypeMismatch {
        topic: String,
        registered: String,
        requested: String,
    },
    #[error("unknown writer {0}")]
    UnknownWriter(WriterId),
    #[error("unknown reader {0}")]
    UnknownReader(ReaderId),
    #[error("reader {0} already has a data-available callback")]
    AlreadySubscribed(ReaderId),
    #[error("writer {0} belongs to another participant")]
    ForeignWriter(WriterId),
    #[error("reader {0} belongs to another participant")]
    ForeignReader(ReaderId),
}

/// Payload encode/decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("failed to encode {type_name}: {message}")]
    Encode { type_name: String, message: String },
    #[error("failed to decode {type_name}: {message}")]
    Decode { type_name: String, message: String },
}

/// A requester or responder could not create one of its entities.
///
/// Setup failures are fatal: nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error creating {entity}: {source}")]
pub struct SetupError {
    pub entity: &'static str,
    #[source]
    pub source: TransportError,
}

impl SetupError {
    pub fn new(entity: &'static str, source: TransportError) -> Self {
        Self { entity, source }
    }
}
