//! Requests reach the responder and replies come back with the right key.

use std::collections::HashMap;

use sourced_rpc::{Domain, EventLoop, LocalParticipant};

use crate::support::{
    control_server, init_logging, recording_client, settle, GetControlValueReq, GetControlValueRes,
};

#[test]
fn single_request_round_trip() {
    init_logging();
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let client = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let (requester, replies) = recording_client(&client);

    let server_loop = EventLoop::new(server);
    let client_loop = EventLoop::new(client);
    settle(&[&server_loop, &client_loop]);

    let key = requester.send_request(&GetControlValueReq::new("rgb_module.exposure"));
    assert!(key.is_valid());
    assert_eq!(key.writer, requester.writer().guid());

    settle(&[&server_loop, &client_loop]);

    assert_eq!(
        *replies.borrow(),
        vec![(key, GetControlValueRes { value: 3000 })]
    );
}

#[test]
fn outstanding_requests_are_told_apart() {
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let client = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let (requester, replies) = recording_client(&client);
    let server_loop = EventLoop::new(server);
    let client_loop = EventLoop::new(client);

    // Both requests go out before either is answered.
    let exposure = requester.send_request(&GetControlValueReq::new("rgb_module.exposure"));
    let gain = requester.send_request(&GetControlValueReq::new("rgb_module.gain"));
    assert_ne!(exposure, gain);

    settle(&[&server_loop, &client_loop]);

    let by_key: HashMap<_, _> = replies
        .borrow()
        .iter()
        .map(|(key, res)| (*key, res.value))
        .collect();
    assert_eq!(by_key.len(), 2);
    assert_eq!(by_key[&exposure], 3000);
    assert_eq!(by_key[&gain], 16);
}

#[test]
fn keys_are_unique_per_request() {
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let client = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let (requester, replies) = recording_client(&client);
    let server_loop = EventLoop::new(server);
    let client_loop = EventLoop::new(client);

    let keys: Vec<_> = (0..5)
        .map(|_| requester.send_request(&GetControlValueReq::new("rgb_module.exposure")))
        .collect();
    settle(&[&server_loop, &client_loop]);

    let sequences: Vec<u64> = keys.iter().map(|k| k.sequence_number.to_u64()).collect();
    assert_eq!(sequences, vec![1, 2, 3, 4, 5]);

    let answered: Vec<_> = replies.borrow().iter().map(|(key, _)| *key).collect();
    assert_eq!(answered, keys, "replies arrive in request order");
}

#[test]
fn no_reply_lost_with_many_outstanding_requests() {
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let client = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let (requester, replies) = recording_client(&client);
    let server_loop = EventLoop::new(server);
    let client_loop = EventLoop::new(client);
    settle(&[&server_loop, &client_loop]);

    // Well past the default history depth.
    let keys: Vec<_> = (0..100)
        .map(|_| requester.send_request(&GetControlValueReq::new("rgb_module.gain")))
        .collect();
    settle(&[&server_loop, &client_loop]);

    let answered: Vec<_> = replies.borrow().iter().map(|(key, _)| *key).collect();
    assert_eq!(answered.len(), 100);
    assert_eq!(answered, keys);
}

#[test]
fn requester_and_responder_share_one_participant() {
    let participant = LocalParticipant::new(&Domain::default());
    let _responder = control_server(&participant);
    let (requester, replies) = recording_client(&participant);
    let event_loop = EventLoop::new(participant);

    let key = requester.send_request(&GetControlValueReq::new("unknown.control"));
    event_loop.drain();

    assert_eq!(
        *replies.borrow(),
        vec![(key, GetControlValueRes { value: -1 })]
    );
}

#[cfg(feature = "json")]
#[test]
fn json_codec_round_trip() {
    use sourced_rpc::{JsonCodec, Requester, Responder};
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::support::descriptor;

    let participant = LocalParticipant::new(&Domain::default());
    let _responder = Responder::new(
        &participant,
        descriptor(),
        JsonCodec::<GetControlValueReq>::new(),
        JsonCodec::<GetControlValueRes>::new(),
        |req: &GetControlValueReq| GetControlValueRes {
            value: req.control_name.len() as i32,
        },
    )
    .unwrap();

    let replies = Rc::new(RefCell::new(Vec::new()));
    let sink = replies.clone();
    let requester = Requester::new(
        &participant,
        descriptor(),
        JsonCodec::<GetControlValueReq>::new(),
        JsonCodec::<GetControlValueRes>::new(),
        move |key, res: GetControlValueRes| sink.borrow_mut().push((key, res.value)),
    )
    .unwrap();

    let key = requester.send_request(&GetControlValueReq::new("abc"));
    EventLoop::new(participant).drain();

    assert_eq!(*replies.borrow(), vec![(key, 3)]);
}
