//! Server side of a request/reply service.

use log::{debug, trace, warn};

use crate::codec::Codec;
use crate::error::SetupError;
use crate::naming::ServiceDescriptor;
use crate::qos::Qos;
use crate::transport::{ReaderId, Transport, WriterId};

/// QoS used by a [`Responder`]'s endpoints. Reliable on both sides by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponderConfig {
    pub request_qos: Qos,
    pub reply_qos: Qos,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            request_qos: Qos::reliable(),
            reply_qos: Qos::reliable(),
        }
    }
}

/// Answers typed requests with a synchronous handler.
///
/// For every valid request the handler is called once, in delivery order,
/// and its result is published on the reply topic with the request's own
/// sample identity as the related identity.
pub struct Responder {
    descriptor: ServiceDescriptor,
    reader: ReaderId,
    writer: WriterId,
}

impl Responder {
    pub fn new<T, Q, S, H>(
        transport: &T,
        descriptor: ServiceDescriptor,
        request_codec: Q,
        response_codec: S,
        handler: H,
    ) -> Result<Self, SetupError>
    where
        T: Transport,
        Q: Codec + 'static,
        S: Codec + 'static,
        H: FnMut(&Q::Message) -> S::Message + 'static,
    {
        Self::with_config(
            transport,
            descriptor,
            ResponderConfig::default(),
            request_codec,
            response_codec,
            handler,
        )
    }

    pub fn with_config<T, Q, S, H>(
        transport: &T,
        descriptor: ServiceDescriptor,
        config: ResponderConfig,
        request_codec: Q,
        response_codec: S,
        mut handler: H,
    ) -> Result<Self, SetupError>
    where
        T: Transport,
        Q: Codec + 'static,
        S: Codec + 'static,
        H: FnMut(&Q::Message) -> S::Message + 'static,
    {
        let writer = transport
            .create_writer(
                descriptor.reply_topic(),
                descriptor.response_type(),
                config.reply_qos,
            )
            .map_err(|e| SetupError::new("response_writer", e))?;
        let reader = transport
            .create_reader(
                descriptor.request_topic(),
                descriptor.request_type(),
                config.request_qos,
            )
            .map_err(|e| SetupError::new("request_reader", e))?;

        let request_topic = descriptor.request_topic().to_string();
        transport
            .subscribe(
                reader,
                Box::new(move |transport: &T, reader| {
                    while let Some(sample) = transport.take_next(reader) {
                        if !sample.info.valid_data {
                            trace!("{}: ignored lifecycle sample", request_topic);
                            continue;
                        }
                        let request_id = sample.info.sample_identity;
                        let request = match request_codec.decode(&sample.payload) {
                            Ok(request) => request,
                            Err(e) => {
                                trace!("{}: dropped request {}: {}", request_topic, request_id, e);
                                continue;
                            }
                        };
                        debug!("{}: received request {}", request_topic, request_id);

                        let response = handler(&request);
                        let payload = match response_codec.encode(&response) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!("{}: reply to {} not sent: {}", request_topic, request_id, e);
                                continue;
                            }
                        };
                        if let Err(e) = transport.publish(writer, payload, Some(request_id)) {
                            warn!("{}: reply to {} not sent: {}", request_topic, request_id, e);
                        }
                    }
                }),
            )
            .map_err(|e| SetupError::new("request_reader listener", e))?;

        debug!(
            "responder ready on {} / {}",
            descriptor.request_topic(),
            descriptor.reply_topic()
        );

        Ok(Self {
            descriptor,
            reader,
            writer,
        })
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn reader(&self) -> ReaderId {
        self.reader
    }

    pub fn writer(&self) -> WriterId {
        self.writer
    }
}
