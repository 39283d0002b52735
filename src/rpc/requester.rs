//! Client side of a request/reply service.

use log::{debug, trace, warn};

use crate::codec::Codec;
use crate::correlation::CorrelationKey;
use crate::error::SetupError;
use crate::naming::ServiceDescriptor;
use crate::qos::Qos;
use crate::transport::{ReaderId, Sample, Transport, WriterId};

/// Settings for a [`Requester`].
///
/// The reply reader is reliable by default so that any number of
/// outstanding requests can be answered without replies being dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequesterConfig {
    pub request_qos: Qos,
    pub reply_qos: Qos,
    /// Only accept replies whose related key names this requester's own
    /// request writer. Off by default: any reply with a valid related key
    /// is handed to the callback.
    pub own_replies_only: bool,
}

impl Default for RequesterConfig {
    fn default() -> Self {
        Self {
            request_qos: Qos::best_effort(),
            reply_qos: Qos::reliable(),
            own_replies_only: false,
        }
    }
}

impl RequesterConfig {
    pub fn with_own_replies_only(mut self, own_replies_only: bool) -> Self {
        self.own_replies_only = own_replies_only;
        self
    }
}

/// Publishes typed requests and hands correlated replies to a callback.
///
/// `send_request` returns the key the transport minted for the request.
/// Every valid reply carrying a related identity is decoded and passed to
/// the callback together with that key, from inside the event loop's drain
/// step. [`RequesterConfig::own_replies_only`] narrows this to replies for
/// this requester's own requests.
///
/// No table of outstanding requests is kept: a request that is never
/// answered simply never produces a callback.
pub struct Requester<T: Transport, Q: Codec> {
    transport: T,
    descriptor: ServiceDescriptor,
    writer: WriterId,
    reader: ReaderId,
    request_codec: Q,
}

impl<T: Transport, Q: Codec> Requester<T, Q> {
    pub fn new<S, F>(
        transport: &T,
        descriptor: ServiceDescriptor,
        request_codec: Q,
        response_codec: S,
        on_response: F,
    ) -> Result<Self, SetupError>
    where
        S: Codec + 'static,
        F: FnMut(CorrelationKey, S::Message) + 'static,
    {
        Self::with_config(
            transport,
            descriptor,
            RequesterConfig::default(),
            request_codec,
            response_codec,
            on_response,
        )
    }

    pub fn with_config<S, F>(
        transport: &T,
        descriptor: ServiceDescriptor,
        config: RequesterConfig,
        request_codec: Q,
        response_codec: S,
        mut on_response: F,
    ) -> Result<Self, SetupError>
    where
        S: Codec + 'static,
        F: FnMut(CorrelationKey, S::Message) + 'static,
    {
        let writer = transport
            .create_writer(
                descriptor.request_topic(),
                descriptor.request_type(),
                config.request_qos,
            )
            .map_err(|e| SetupError::new("request_writer", e))?;
        let reader = transport
            .create_reader(
                descriptor.reply_topic(),
                descriptor.response_type(),
                config.reply_qos,
            )
            .map_err(|e| SetupError::new("response_reader", e))?;

        let reply_topic = descriptor.reply_topic().to_string();
        let own_writer = config.own_replies_only.then_some(writer);
        transport
            .subscribe(
                reader,
                Box::new(move |transport: &T, reader| {
                    while let Some(sample) = transport.take_next(reader) {
                        let Some(key) = related_request(&sample, own_writer) else {
                            trace!("{}: dropped unrelated sample {}", reply_topic, sample.info.sample_identity);
                            continue;
                        };
                        match response_codec.decode(&sample.payload) {
                            Ok(response) => {
                                debug!("{}: reply for request {}", reply_topic, key);
                                on_response(key, response);
                            }
                            Err(e) => trace!("{}: dropped reply for request {}: {}", reply_topic, key, e),
                        }
                    }
                }),
            )
            .map_err(|e| SetupError::new("response_reader listener", e))?;

        debug!(
            "requester ready on {} / {}",
            descriptor.request_topic(),
            descriptor.reply_topic()
        );

        Ok(Self {
            transport: transport.clone(),
            descriptor,
            writer,
            reader,
            request_codec,
        })
    }

    /// Publish `request` and return its correlation key.
    ///
    /// Never blocks and never fails: encode or publish errors are logged and
    /// reported as [`CorrelationKey::UNKNOWN`], which no reply can match.
    pub fn send_request(&self, request: &Q::Message) -> CorrelationKey {
        let payload = match self.request_codec.encode(request) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{}: {}", self.descriptor.request_topic(), e);
                return CorrelationKey::UNKNOWN;
            }
        };

        match self.transport.publish(self.writer, payload, None) {
            Ok(key) => {
                debug!("{}: sent request {}", self.descriptor.request_topic(), key);
                key
            }
            Err(e) => {
                warn!("{}: publish failed: {}", self.descriptor.request_topic(), e);
                CorrelationKey::UNKNOWN
            }
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn writer(&self) -> WriterId {
        self.writer
    }

    pub fn reader(&self) -> ReaderId {
        self.reader
    }
}

/// Key of the request `sample` answers. With `own_writer` set, only
/// requests sent by that writer count.
fn related_request(sample: &Sample, own_writer: Option<WriterId>) -> Option<CorrelationKey> {
    if !sample.info.valid_data {
        return None;
    }
    sample
        .related_key()
        .filter(|key| own_writer.map_or(true, |writer| key.writer == writer.guid()))
}
