//! Single-threaded handle onto a [`Domain`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use log::{error, trace, warn};

use super::domain::Domain;
use super::listener::{LoggingListener, MatchEvent, MatchStatus, PeerListener};
use super::{ReadyCallback, ReaderId, Sample, Transport, WriterId};
use crate::correlation::{CorrelationKey, Guid, GuidPrefix};
use crate::error::TransportError;
use crate::qos::Qos;
use crate::time::Deadline;

// Low byte of an entity id tells writers and readers apart.
const ENTITY_KIND_WRITER: u32 = 0x02;
const ENTITY_KIND_READER: u32 = 0x07;

/// A participant in an in-process [`Domain`].
///
/// Owns a GUID prefix, the endpoints it creates, their data-available
/// callbacks and a [`PeerListener`]. Clones are handles to the same
/// participant; when the last handle is dropped its endpoints leave the
/// domain and remote peers receive unmatched notifications.
///
/// The handle is deliberately `!Send`: everything it dispatches runs on the
/// thread that created it.
#[derive(Clone)]
pub struct LocalParticipant {
    inner: Rc<Inner>,
}

struct Inner {
    domain: Domain,
    prefix: GuidPrefix,
    next_entity: Cell<u32>,
    callbacks: RefCell<HashMap<ReaderId, ReadyCallback<LocalParticipant>>>,
    listener: RefCell<Box<dyn PeerListener>>,
}

enum Work {
    Peer(MatchEvent),
    Data(ReaderId),
}

impl LocalParticipant {
    /// Join `domain` with a listener that logs peer matching.
    pub fn new(domain: &Domain) -> Self {
        Self::with_listener(domain, LoggingListener)
    }

    pub fn with_listener(domain: &Domain, listener: impl PeerListener + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                domain: domain.clone(),
                prefix: GuidPrefix::random(),
                next_entity: Cell::new(1),
                callbacks: RefCell::new(HashMap::new()),
                listener: RefCell::new(Box::new(listener)),
            }),
        }
    }

    pub fn guid_prefix(&self) -> GuidPrefix {
        self.inner.prefix
    }

    pub fn domain(&self) -> &Domain {
        &self.inner.domain
    }

    fn next_guid(&self, kind: u32) -> Guid {
        let n = self.inner.next_entity.get();
        self.inner.next_entity.set(n + 1);
        Guid::new(self.inner.prefix, (n << 8) | kind)
    }

    fn owns(&self, guid: Guid) -> bool {
        guid.prefix == self.inner.prefix
    }

    fn publish_sample(
        &self,
        writer: WriterId,
        payload: Vec<u8>,
        related: Option<CorrelationKey>,
        valid_data: bool,
    ) -> Result<CorrelationKey, TransportError> {
        if !self.owns(writer.guid()) {
            return Err(TransportError::ForeignWriter(writer));
        }
        let available_at = Instant::now() + self.inner.domain.config().latency;
        let key = self.inner.domain.lock("publish")?.publish(
            writer,
            payload,
            related,
            valid_data,
            available_at,
        )?;
        self.inner.domain.notify();
        Ok(key)
    }

    /// Block until a unit of work is available or `deadline` passes.
    fn wait_for_work(&self, deadline: Deadline) -> Result<Option<Work>, TransportError> {
        let domain = &self.inner.domain;
        let prefix = self.inner.prefix;
        let mut state = domain.lock("spin")?;

        loop {
            let now = Instant::now();
            if let Some(event) = state.pop_event(prefix) {
                return Ok(Some(Work::Peer(event)));
            }
            if let Some(reader) = state.ready_reader(prefix, now) {
                state.mark_announced(reader, now);
                return Ok(Some(Work::Data(reader)));
            }

            let wake = state
                .next_delivery(prefix, now)
                .map_or(deadline, |at| deadline.min(Deadline::At(at)));
            if wake.has_passed(now) {
                return Ok(None);
            }
            state = domain.wait(state, wake.remaining(now))?;
        }
    }

    fn dispatch_peer(&self, event: MatchEvent) {
        let Ok(mut listener) = self.inner.listener.try_borrow_mut() else {
            warn!("peer listener busy, dropped notification: {}", event);
            return;
        };
        match event.status {
            MatchStatus::Matched => listener.on_matched(&event),
            MatchStatus::Unmatched => listener.on_unmatched(&event),
        }
    }

    fn dispatch_data(&self, reader: ReaderId) {
        // Taken out for the duration of the call so the callback may use the
        // participant freely, including registering other callbacks.
        let callback = self.inner.callbacks.borrow_mut().remove(&reader);
        let Some(mut callback) = callback else {
            trace!("no callback for {}", reader);
            return;
        };
        callback(self, reader);
        self.inner
            .callbacks
            .borrow_mut()
            .entry(reader)
            .or_insert(callback);
    }
}

impl Transport for LocalParticipant {
    fn create_writer(
        &self,
        topic: &str,
        type_name: &str,
        _qos: Qos,
    ) -> Result<WriterId, TransportError> {
        let writer = WriterId(self.next_guid(ENTITY_KIND_WRITER));
        self.inner
            .domain
            .lock("create_writer")?
            .add_writer(writer, topic, type_name)?;
        self.inner.domain.notify();
        Ok(writer)
    }

    fn create_reader(
        &self,
        topic: &str,
        type_name: &str,
        qos: Qos,
    ) -> Result<ReaderId, TransportError> {
        let reader = ReaderId(self.next_guid(ENTITY_KIND_READER));
        self.inner
            .domain
            .lock("create_reader")?
            .add_reader(reader, topic, type_name, qos)?;
        self.inner.domain.notify();
        Ok(reader)
    }

    fn publish(
        &self,
        writer: WriterId,
        payload: Vec<u8>,
        related: Option<CorrelationKey>,
    ) -> Result<CorrelationKey, TransportError> {
        self.publish_sample(writer, payload, related, true)
    }

    fn dispose(&self, writer: WriterId) -> Result<(), TransportError> {
        self.publish_sample(writer, Vec::new(), None, false).map(|_| ())
    }

    fn subscribe(
        &self,
        reader: ReaderId,
        on_ready: ReadyCallback<Self>,
    ) -> Result<(), TransportError> {
        if !self.owns(reader.guid()) {
            return Err(TransportError::ForeignReader(reader));
        }
        self.inner.domain.lock("subscribe")?.set_subscribed(reader)?;
        self.inner.callbacks.borrow_mut().insert(reader, on_ready);
        Ok(())
    }

    fn take_next(&self, reader: ReaderId) -> Option<Sample> {
        if !self.owns(reader.guid()) {
            return None;
        }
        match self.inner.domain.lock("take_next") {
            Ok(mut state) => state.take_next(reader, Instant::now()),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    fn has_pending_work(&self) -> bool {
        match self.inner.domain.lock("has_pending_work") {
            Ok(state) => state.has_work(self.inner.prefix, Instant::now()),
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    fn next_work_timepoint(&self) -> Deadline {
        match self.inner.domain.lock("next_work_timepoint") {
            Ok(state) => {
                let now = Instant::now();
                if state.has_work(self.inner.prefix, now) {
                    return Deadline::At(now);
                }
                state
                    .next_delivery(self.inner.prefix, now)
                    .map_or(Deadline::Never, Deadline::At)
            }
            Err(e) => {
                error!("{}", e);
                Deadline::Never
            }
        }
    }

    fn spin(&self, deadline: Deadline) {
        match self.wait_for_work(deadline) {
            Ok(Some(Work::Peer(event))) => self.dispatch_peer(event),
            Ok(Some(Work::Data(reader))) => self.dispatch_data(reader),
            Ok(None) => {}
            Err(e) => error!("{}", e),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        match self.domain.lock("leave") {
            Ok(mut state) => state.remove_participant(self.prefix),
            Err(e) => {
                error!("{}", e);
                return;
            }
        }
        self.domain.notify();
    }
}
