//! # sourced_rpc
//!
//! Request/reply services over publish/subscribe channels.
//!
//! A publish/subscribe transport only broadcasts uncorrelated samples. This
//! crate layers RPC semantics on top of it: a [`Requester`] publishes typed
//! requests and gets back the [`CorrelationKey`] the transport minted for
//! each one; a [`Responder`] answers with the request's key stamped into the
//! reply's metadata; the requester hands each reply to a callback together
//! with that key. Any number of requests may be outstanding at once.
//!
//! Everything is driven by a cooperative, single-threaded [`EventLoop`]:
//! callbacks and handlers run inside its drain step, one at a time.
//!
//! ## Modules
//!
//! - [`naming`] - deterministic topic/type names per service
//! - [`correlation`] - sample identities and correlation keys
//! - [`codec`] - payload encoding (bitcode, JSON)
//! - [`transport`] - the publish/subscribe trait and an in-process domain
//! - [`rpc`] - requester and responder
//! - [`executor`] - event loop and periodic timer

pub mod codec;
pub mod correlation;
mod error;
pub mod executor;
pub mod naming;
pub mod qos;
pub mod rpc;
pub mod time;
pub mod transport;

pub use codec::{BitcodeCodec, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use correlation::{CorrelationKey, Guid, GuidPrefix, SequenceNumber};
pub use error::{CodecError, SetupError, TransportError};
pub use executor::{EventLoop, Timer};
pub use naming::{derive_names, ServiceDescriptor};
pub use qos::{Qos, Reliability};
pub use rpc::{Requester, RequesterConfig, Responder, ResponderConfig};
pub use time::{Clock, Deadline, ManualClock, SystemClock};
pub use transport::{
    Domain, DomainConfig, LocalParticipant, LoggingListener, MatchEvent, PeerListener, ReaderId,
    Sample, SampleInfo, Transport, WriterId,
};
