//! In-process publish/subscribe domain.
//!
//! A `Domain` is the shared half of the in-process transport: it holds the
//! topic registry, every endpoint, and a sample queue per reader. Each
//! thread attaches its own [`LocalParticipant`](super::LocalParticipant) to
//! the domain; participants on different threads rendezvous purely by topic
//! name, the way separate processes would on a real network.
//!
//! Features:
//! - Thread-safe (cloning shares the same domain)
//! - Fan-out: every reader on a topic receives every sample, in publish order
//! - Volatile: readers created after a publish do not see that sample
//! - Optional fixed delivery latency, which is what gives the transport
//!   internally scheduled work

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime};

use log::debug;

use super::listener::{EndpointKind, MatchEvent, MatchStatus};
use super::{ReaderId, Sample, SampleInfo, WriterId};
use crate::correlation::{CorrelationKey, Guid, GuidPrefix, SequenceNumber};
use crate::error::TransportError;
use crate::qos::Qos;

/// Domain-wide settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainConfig {
    /// Delay between a publish and the sample becoming available to readers.
    pub latency: Duration,
}

impl DomainConfig {
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Shared in-process domain. Cheap to clone.
///
/// ## Example
///
/// ```
/// use sourced_rpc::{Domain, LocalParticipant, Qos, Transport};
///
/// let domain = Domain::default();
/// let participant = LocalParticipant::new(&domain);
///
/// let writer = participant.create_writer("chatter", "String_", Qos::default()).unwrap();
/// let reader = participant.create_reader("chatter", "String_", Qos::default()).unwrap();
///
/// let key = participant.publish(writer, b"hello".to_vec(), None).unwrap();
/// let sample = participant.take_next(reader).unwrap();
/// assert_eq!(sample.payload, b"hello");
/// assert_eq!(sample.info.sample_identity, key);
/// ```
#[derive(Clone, Default)]
pub struct Domain {
    shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    config: DomainConfig,
    state: Mutex<DomainState>,
    wakeup: Condvar,
}

impl Domain {
    pub fn new(config: DomainConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(DomainState::default()),
                wakeup: Condvar::new(),
            }),
        }
    }

    pub fn config(&self) -> &DomainConfig {
        &self.shared.config
    }

    /// Type registered for `topic`, if any endpoint ever used it.
    pub fn topic_type(&self, topic: &str) -> Option<String> {
        self.lock("topic_type")
            .ok()
            .and_then(|state| state.topics.get(topic).map(|t| t.type_name.clone()))
    }

    /// Names of all registered topics.
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .lock("topics")
            .map(|state| state.topics.keys().cloned().collect())
            .unwrap_or_default();
        topics.sort();
        topics
    }

    pub(crate) fn lock(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, DomainState>, TransportError> {
        self.shared
            .state
            .lock()
            .map_err(|_| TransportError::LockPoisoned(operation))
    }

    /// Block on the domain until notified or `timeout` elapses (`None` = forever).
    pub(crate) fn wait<'a>(
        &self,
        guard: MutexGuard<'a, DomainState>,
        timeout: Option<Duration>,
    ) -> Result<MutexGuard<'a, DomainState>, TransportError> {
        match timeout {
            Some(timeout) => self
                .shared
                .wakeup
                .wait_timeout(guard, timeout)
                .map(|(guard, _)| guard)
                .map_err(|_| TransportError::LockPoisoned("wait")),
            None => self
                .shared
                .wakeup
                .wait(guard)
                .map_err(|_| TransportError::LockPoisoned("wait")),
        }
    }

    /// Wake every participant blocked in `wait`.
    pub(crate) fn notify(&self) {
        self.shared.wakeup.notify_all();
    }
}

struct TopicEntry {
    type_name: String,
    writers: Vec<WriterId>,
    readers: Vec<ReaderId>,
}

struct WriterEntry {
    topic: String,
    last_sequence: SequenceNumber,
}

struct ReaderEntry {
    topic: String,
    qos: Qos,
    queue: VecDeque<Pending>,
    /// Highest arrival already announced through the data-available callback.
    announced: u64,
    subscribed: bool,
}

struct Pending {
    arrival: u64,
    available_at: Instant,
    sample: Sample,
}

impl ReaderEntry {
    /// Latest arrival that is available at `now`, if any.
    fn latest_available(&self, now: Instant) -> Option<u64> {
        self.queue
            .iter()
            .take_while(|p| p.available_at <= now)
            .last()
            .map(|p| p.arrival)
    }

    fn is_ready(&self, now: Instant) -> bool {
        self.subscribed
            && self
                .latest_available(now)
                .is_some_and(|arrival| arrival > self.announced)
    }

    fn next_delivery(&self, now: Instant) -> Option<Instant> {
        if !self.subscribed {
            return None;
        }
        self.queue
            .iter()
            .map(|p| p.available_at)
            .find(|at| *at > now)
    }
}

/// Everything behind the domain lock.
#[derive(Default)]
pub(crate) struct DomainState {
    topics: HashMap<String, TopicEntry>,
    writers: BTreeMap<WriterId, WriterEntry>,
    readers: BTreeMap<ReaderId, ReaderEntry>,
    peer_events: HashMap<GuidPrefix, VecDeque<MatchEvent>>,
    arrivals: u64,
}

impl DomainState {
    fn register_topic(
        &mut self,
        topic: &str,
        type_name: &str,
    ) -> Result<&mut TopicEntry, TransportError> {
        let entry = self
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| TopicEntry {
                type_name: type_name.to_string(),
                writers: Vec::new(),
                readers: Vec::new(),
            });

        if entry.type_name != type_name {
            return Err(TransportError::TypeMismatch {
                topic: topic.to_string(),
                registered: entry.type_name.clone(),
                requested: type_name.to_string(),
            });
        }
        Ok(entry)
    }

    fn push_event(&mut self, owner: Guid, kind: EndpointKind, status: MatchStatus, topic: &str, remote: Guid) {
        self.peer_events
            .entry(owner.prefix)
            .or_default()
            .push_back(MatchEvent {
                kind,
                status,
                topic: topic.to_string(),
                local: owner,
                remote,
            });
    }

    pub(crate) fn add_writer(
        &mut self,
        writer: WriterId,
        topic: &str,
        type_name: &str,
    ) -> Result<(), TransportError> {
        let entry = self.register_topic(topic, type_name)?;
        entry.writers.push(writer);
        let readers = entry.readers.clone();

        self.writers.insert(
            writer,
            WriterEntry {
                topic: topic.to_string(),
                last_sequence: SequenceNumber::UNKNOWN,
            },
        );

        for reader in readers {
            self.push_event(writer.guid(), EndpointKind::Publication, MatchStatus::Matched, topic, reader.guid());
            self.push_event(reader.guid(), EndpointKind::Subscription, MatchStatus::Matched, topic, writer.guid());
        }
        Ok(())
    }

    pub(crate) fn add_reader(
        &mut self,
        reader: ReaderId,
        topic: &str,
        type_name: &str,
        qos: Qos,
    ) -> Result<(), TransportError> {
        let entry = self.register_topic(topic, type_name)?;
        entry.readers.push(reader);
        let writers = entry.writers.clone();

        self.readers.insert(
            reader,
            ReaderEntry {
                topic: topic.to_string(),
                qos,
                queue: VecDeque::new(),
                announced: 0,
                subscribed: false,
            },
        );

        for writer in writers {
            self.push_event(reader.guid(), EndpointKind::Subscription, MatchStatus::Matched, topic, writer.guid());
            self.push_event(writer.guid(), EndpointKind::Publication, MatchStatus::Matched, topic, reader.guid());
        }
        Ok(())
    }

    pub(crate) fn set_subscribed(&mut self, reader: ReaderId) -> Result<(), TransportError> {
        let entry = self
            .readers
            .get_mut(&reader)
            .ok_or(TransportError::UnknownReader(reader))?;
        if entry.subscribed {
            return Err(TransportError::AlreadySubscribed(reader));
        }
        entry.subscribed = true;
        Ok(())
    }

    /// Mint the next key for `writer` and queue the sample on every reader of its topic.
    pub(crate) fn publish(
        &mut self,
        writer: WriterId,
        payload: Vec<u8>,
        related: Option<CorrelationKey>,
        valid_data: bool,
        available_at: Instant,
    ) -> Result<CorrelationKey, TransportError> {
        let entry = self
            .writers
            .get_mut(&writer)
            .ok_or(TransportError::UnknownWriter(writer))?;
        entry.last_sequence = entry.last_sequence.next();
        let key = CorrelationKey::new(writer.guid(), entry.last_sequence);
        let topic = entry.topic.clone();

        let readers = self
            .topics
            .get(&topic)
            .map(|t| t.readers.clone())
            .unwrap_or_default();

        let info = SampleInfo {
            valid_data,
            sample_identity: key,
            related_sample_identity: related,
            source_timestamp: SystemTime::now(),
        };

        for reader in readers {
            let Some(entry) = self.readers.get_mut(&reader) else {
                continue;
            };
            self.arrivals += 1;
            entry.queue.push_back(Pending {
                arrival: self.arrivals,
                available_at,
                sample: Sample {
                    payload: payload.clone(),
                    info: info.clone(),
                },
            });

            if !entry.qos.is_reliable() && entry.queue.len() > entry.qos.history_depth {
                if let Some(dropped) = entry.queue.pop_front() {
                    debug!(
                        "{} on {} full, dropped sample {}",
                        reader, entry.topic, dropped.sample.info.sample_identity
                    );
                }
            }
        }

        Ok(key)
    }

    pub(crate) fn take_next(&mut self, reader: ReaderId, now: Instant) -> Option<Sample> {
        let entry = self.readers.get_mut(&reader)?;
        if entry.queue.front()?.available_at > now {
            return None;
        }
        entry.queue.pop_front().map(|p| p.sample)
    }

    pub(crate) fn pop_event(&mut self, owner: GuidPrefix) -> Option<MatchEvent> {
        self.peer_events.get_mut(&owner)?.pop_front()
    }

    /// First subscribed reader of `owner` with samples it has not been told about.
    pub(crate) fn ready_reader(&self, owner: GuidPrefix, now: Instant) -> Option<ReaderId> {
        self.readers
            .iter()
            .filter(|(id, _)| id.guid().prefix == owner)
            .find(|(_, entry)| entry.is_ready(now))
            .map(|(id, _)| *id)
    }

    /// Record that the reader's callback is about to see everything available at `now`.
    pub(crate) fn mark_announced(&mut self, reader: ReaderId, now: Instant) {
        if let Some(entry) = self.readers.get_mut(&reader) {
            if let Some(latest) = entry.latest_available(now) {
                entry.announced = entry.announced.max(latest);
            }
        }
    }

    pub(crate) fn has_work(&self, owner: GuidPrefix, now: Instant) -> bool {
        self.peer_events
            .get(&owner)
            .is_some_and(|events| !events.is_empty())
            || self.ready_reader(owner, now).is_some()
    }

    /// Earliest future delivery to a subscribed reader of `owner`.
    pub(crate) fn next_delivery(&self, owner: GuidPrefix, now: Instant) -> Option<Instant> {
        self.readers
            .iter()
            .filter(|(id, _)| id.guid().prefix == owner)
            .filter_map(|(_, entry)| entry.next_delivery(now))
            .min()
    }

    /// Drop every endpoint of `owner` and tell the remaining peers.
    pub(crate) fn remove_participant(&mut self, owner: GuidPrefix) {
        let writers: Vec<(WriterId, String)> = self
            .writers
            .iter()
            .filter(|(id, _)| id.guid().prefix == owner)
            .map(|(id, entry)| (*id, entry.topic.clone()))
            .collect();
        let readers: Vec<(ReaderId, String)> = self
            .readers
            .iter()
            .filter(|(id, _)| id.guid().prefix == owner)
            .map(|(id, entry)| (*id, entry.topic.clone()))
            .collect();

        for (writer, topic) in writers {
            self.writers.remove(&writer);
            let remote_readers = match self.topics.get_mut(&topic) {
                Some(entry) => {
                    entry.writers.retain(|w| *w != writer);
                    entry.readers.clone()
                }
                None => continue,
            };
            for reader in remote_readers.into_iter().filter(|r| r.guid().prefix != owner) {
                self.push_event(reader.guid(), EndpointKind::Subscription, MatchStatus::Unmatched, &topic, writer.guid());
            }
        }

        for (reader, topic) in readers {
            self.readers.remove(&reader);
            let remote_writers = match self.topics.get_mut(&topic) {
                Some(entry) => {
                    entry.readers.retain(|r| *r != reader);
                    entry.writers.clone()
                }
                None => continue,
            };
            for writer in remote_writers.into_iter().filter(|w| w.guid().prefix != owner) {
                self.push_event(writer.guid(), EndpointKind::Publication, MatchStatus::Unmatched, &topic, reader.guid());
            }
        }

        self.peer_events.remove(&owner);
    }
}
