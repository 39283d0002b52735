//! Request/reply on top of publish/subscribe.
//!
//! A [`Requester`] and a [`Responder`] built from the same
//! [`ServiceDescriptor`](crate::ServiceDescriptor) meet on two topics: the
//! request topic and the reply topic. Correlation rides on sample metadata:
//!
//! ```text
//!  Requester                          Responder
//!  send_request(req) ──► key K
//!     publish(rq/…, req) ───────────► sample_identity = K
//!                                     handler(req) -> res
//!     ◄──────────── publish(rr/…, res, related = K)
//!  on_response(K, res)
//! ```
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use sourced_rpc::{
//!     BitcodeCodec, Domain, EventLoop, LocalParticipant, Requester, Responder, ServiceDescriptor,
//! };
//!
//! let participant = LocalParticipant::new(&Domain::default());
//! let names = ServiceDescriptor::derive("add_one", "AddOneSrv_");
//!
//! let _responder = Responder::new(
//!     &participant,
//!     names.clone(),
//!     BitcodeCodec::<u32>::new(),
//!     BitcodeCodec::<u32>::new(),
//!     |n: &u32| n + 1,
//! )
//! .unwrap();
//!
//! let replies = Rc::new(RefCell::new(Vec::new()));
//! let sink = replies.clone();
//! let requester = Requester::new(
//!     &participant,
//!     names,
//!     BitcodeCodec::<u32>::new(),
//!     BitcodeCodec::<u32>::new(),
//!     move |key, n: u32| sink.borrow_mut().push((key, n)),
//! )
//! .unwrap();
//!
//! let key = requester.send_request(&41);
//! let event_loop = EventLoop::new(participant);
//! event_loop.drain();
//!
//! assert_eq!(*replies.borrow(), vec![(key, 42)]);
//! ```

mod requester;
mod responder;

pub use requester::{Requester, RequesterConfig};
pub use responder::{Responder, ResponderConfig};
