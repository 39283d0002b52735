//! Peer matching notifications.

use std::fmt;

use log::info;

use crate::correlation::Guid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// A local writer gained or lost a remote reader.
    Publication,
    /// A local reader gained or lost a remote writer.
    Subscription,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    Matched,
    Unmatched,
}

/// A local endpoint was matched with, or lost, an endpoint of the opposite
/// direction on the same topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchEvent {
    pub kind: EndpointKind,
    pub status: MatchStatus,
    pub topic: String,
    pub local: Guid,
    pub remote: Guid,
}

impl fmt::Display for MatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self.kind {
            EndpointKind::Publication => "Publisher",
            EndpointKind::Subscription => "Subscriber",
        };
        let status = match self.status {
            MatchStatus::Matched => "matched",
            MatchStatus::Unmatched => "unmatched",
        };
        write!(f, "{} {} {} (remote {})", role, status, self.topic, self.remote)
    }
}

/// Receives peer lifecycle notifications.
///
/// Notifications are informational; the default methods only log them.
pub trait PeerListener {
    fn on_matched(&mut self, event: &MatchEvent) {
        info!("{}", event);
    }

    fn on_unmatched(&mut self, event: &MatchEvent) {
        info!("{}", event);
    }
}

/// Listener that logs every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingListener;

impl PeerListener for LoggingListener {}
