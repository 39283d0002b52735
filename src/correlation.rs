//! Sample identities and correlation keys.
//!
//! Every sample published on a writer gets an identity made of the writer's
//! GUID and a per-writer sequence number. A reply carries the identity of the
//! request it answers as its *related* identity, which is how a requester
//! matches replies to the calls it made.

use std::fmt;

/// 12-byte prefix shared by every endpoint of one participant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GuidPrefix(pub [u8; 12]);

impl GuidPrefix {
    pub const UNKNOWN: GuidPrefix = GuidPrefix([0; 12]);

    /// Mint a fresh random prefix for a new participant.
    pub fn random() -> Self {
        let bytes = uuid::Uuid::new_v4().into_bytes();
        let mut prefix = [0u8; 12];
        prefix.copy_from_slice(&bytes[..12]);
        GuidPrefix(prefix)
    }
}

impl fmt::Display for GuidPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Globally unique endpoint identity: participant prefix + entity id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub prefix: GuidPrefix,
    pub entity_id: u32,
}

impl Guid {
    pub const UNKNOWN: Guid = Guid {
        prefix: GuidPrefix::UNKNOWN,
        entity_id: 0,
    };

    pub fn new(prefix: GuidPrefix, entity_id: u32) -> Self {
        Self { prefix, entity_id }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08x}", self.prefix, self.entity_id)
    }
}

/// Per-writer sample sequence number. The first published sample is 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceNumber(pub u64);

impl SequenceNumber {
    pub const UNKNOWN: SequenceNumber = SequenceNumber(0);

    pub fn to_u64(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        SequenceNumber(self.0 + 1)
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one published sample, used as the request/reply correlation key.
///
/// Minted by the transport when a sample is published and compared by value.
/// [`CorrelationKey::UNKNOWN`] stands for "no key" and never matches a
/// published sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationKey {
    pub writer: Guid,
    pub sequence_number: SequenceNumber,
}

impl CorrelationKey {
    pub const UNKNOWN: CorrelationKey = CorrelationKey {
        writer: Guid::UNKNOWN,
        sequence_number: SequenceNumber::UNKNOWN,
    };

    pub fn new(writer: Guid, sequence_number: SequenceNumber) -> Self {
        Self {
            writer,
            sequence_number,
        }
    }

    /// `false` for [`CorrelationKey::UNKNOWN`].
    pub fn is_valid(&self) -> bool {
        *self != Self::UNKNOWN
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.writer, self.sequence_number)
    }
}
