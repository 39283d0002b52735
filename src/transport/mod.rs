//! Transport - the publish/subscribe collaborator the request/reply layer runs on.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │ Requester                    │      │ Responder                    │
//! │  writer  ── rq/<svc>Request ─┼──┐   │  reader ◄──────────────────┐ │
//! │  reader ◄── rr/<svc>Reply ───┼┐ │   │  writer ── rr/<svc>Reply ─┐│ │
//! └──────────────────────────────┘│ │   └───────────────────────────┼┼─┘
//!                                 │ ▼                               ▼│
//! ┌───────────────────────────────┴──────────────────────────────────┴──┐
//! │                       Transport (trait)                             │
//! │  create_writer / create_reader / publish / subscribe / take_next    │
//! │  has_pending_work / next_work_timepoint / spin                      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//!              ┌────────────────────────────────────┐
//!              │ LocalParticipant  ──►  Domain      │
//!              │ (one per thread)      (shared)     │
//!              └────────────────────────────────────┘
//! ```
//!
//! Delivery is reactor style: a reader registers one callback, the
//! participant invokes it from `spin` when new samples are ready, and the
//! callback drains them with `take_next`.

mod domain;
mod listener;
mod participant;

use std::fmt;
use std::time::SystemTime;

use crate::correlation::{CorrelationKey, Guid};
use crate::error::TransportError;
use crate::qos::Qos;
use crate::time::Deadline;

pub use domain::{Domain, DomainConfig};
pub use listener::{EndpointKind, LoggingListener, MatchEvent, MatchStatus, PeerListener};
pub use participant::LocalParticipant;

/// Identity of a writer endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriterId(pub Guid);

/// Identity of a reader endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReaderId(pub Guid);

impl WriterId {
    pub fn guid(&self) -> Guid {
        self.0
    }
}

impl ReaderId {
    pub fn guid(&self) -> Guid {
        self.0
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "writer {}", self.0)
    }
}

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reader {}", self.0)
    }
}

/// Metadata the transport attaches to every delivered sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleInfo {
    /// `false` for lifecycle samples (disposals) that carry no payload.
    pub valid_data: bool,
    /// Key minted when this sample was published.
    pub sample_identity: CorrelationKey,
    /// Back-reference set by the publisher, e.g. the request a reply answers.
    pub related_sample_identity: Option<CorrelationKey>,
    pub source_timestamp: SystemTime,
}

/// A sample taken from a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Serialized payload. Empty when `info.valid_data` is false.
    pub payload: Vec<u8>,
    pub info: SampleInfo,
}

impl Sample {
    /// The related identity, if present and not `UNKNOWN`.
    pub fn related_key(&self) -> Option<CorrelationKey> {
        self.info
            .related_sample_identity
            .filter(CorrelationKey::is_valid)
    }
}

/// Data-available callback registered on a reader.
///
/// Receives the transport itself so the callback can take samples and
/// publish replies without holding its own handle.
pub type ReadyCallback<T> = Box<dyn FnMut(&T, ReaderId)>;

/// Publish/subscribe primitives needed by requesters, responders and the
/// event loop.
///
/// Implementations are single-threaded handles: every method, including the
/// callbacks invoked from [`spin`](Transport::spin), runs on the thread that
/// owns the handle. Cloning yields another handle to the same endpoints.
pub trait Transport: Clone + 'static {
    /// Create a writer on `topic`, registering `type_name` for it if needed.
    fn create_writer(&self, topic: &str, type_name: &str, qos: Qos)
        -> Result<WriterId, TransportError>;

    /// Create a reader on `topic`, registering `type_name` for it if needed.
    fn create_reader(&self, topic: &str, type_name: &str, qos: Qos)
        -> Result<ReaderId, TransportError>;

    /// Publish one sample and return the key minted for it.
    ///
    /// `related` is stamped into the sample's metadata as its
    /// `related_sample_identity`.
    fn publish(
        &self,
        writer: WriterId,
        payload: Vec<u8>,
        related: Option<CorrelationKey>,
    ) -> Result<CorrelationKey, TransportError>;

    /// Tell readers the writer's instance is gone (`valid_data == false`).
    fn dispose(&self, writer: WriterId) -> Result<(), TransportError>;

    /// Register the data-available callback of a reader.
    fn subscribe(&self, reader: ReaderId, on_ready: ReadyCallback<Self>)
        -> Result<(), TransportError>;

    /// Take the oldest available sample. `None` means no more samples right now.
    fn take_next(&self, reader: ReaderId) -> Option<Sample>;

    /// Whether a unit of work can be processed without waiting.
    fn has_pending_work(&self) -> bool;

    /// Next time the transport itself needs to run.
    fn next_work_timepoint(&self) -> Deadline;

    /// Wait until `deadline` or until work is available, then process at
    /// most one unit of work.
    fn spin(&self, deadline: Deadline);
}
