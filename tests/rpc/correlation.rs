//! Samples on the reply topic that do not answer one of our requests are dropped.

use sourced_rpc::{
    BitcodeCodec, Codec, CorrelationKey, Domain, EventLoop, Guid, GuidPrefix, LocalParticipant,
    Qos, RequesterConfig, SequenceNumber, Transport,
};

use crate::support::{
    control_server, descriptor, recording_client, recording_client_with, settle,
    GetControlValueReq, GetControlValueRes,
};

/// A participant publishing straight onto the reply topic.
fn rogue_replier(domain: &Domain) -> (LocalParticipant, sourced_rpc::WriterId) {
    let rogue = LocalParticipant::new(domain);
    let names = descriptor();
    let writer = rogue
        .create_writer(names.reply_topic(), names.response_type(), Qos::default())
        .unwrap();
    (rogue, writer)
}

fn encoded_reply(value: i32) -> Vec<u8> {
    BitcodeCodec::<GetControlValueRes>::new()
        .encode(&GetControlValueRes { value })
        .unwrap()
}

#[test]
fn reply_without_related_identity_is_ignored() {
    let domain = Domain::default();
    let client = LocalParticipant::new(&domain);
    let (_requester, replies) = recording_client(&client);
    let (rogue, writer) = rogue_replier(&domain);

    rogue.publish(writer, encoded_reply(1), None).unwrap();
    EventLoop::new(client).drain();

    assert!(replies.borrow().is_empty());
}

#[test]
fn reply_with_unknown_identity_is_ignored() {
    let domain = Domain::default();
    let client = LocalParticipant::new(&domain);
    let (_requester, replies) = recording_client(&client);
    let (rogue, writer) = rogue_replier(&domain);

    rogue
        .publish(writer, encoded_reply(1), Some(CorrelationKey::UNKNOWN))
        .unwrap();
    EventLoop::new(client).drain();

    assert!(replies.borrow().is_empty());
}

#[test]
fn disposal_on_reply_topic_is_ignored() {
    let domain = Domain::default();
    let client = LocalParticipant::new(&domain);
    let (_requester, replies) = recording_client(&client);
    let (rogue, writer) = rogue_replier(&domain);

    rogue.dispose(writer).unwrap();
    let client_loop = EventLoop::new(client);
    assert!(client_loop.drain() > 0);

    assert!(replies.borrow().is_empty());
}

#[test]
fn undecodable_reply_is_dropped() {
    let domain = Domain::default();
    let client = LocalParticipant::new(&domain);
    let (requester, replies) = recording_client(&client);
    let (rogue, writer) = rogue_replier(&domain);

    let key = requester.send_request(&GetControlValueReq::new("rgb_module.exposure"));
    rogue.publish(writer, Vec::new(), Some(key)).unwrap();
    EventLoop::new(client).drain();

    assert!(replies.borrow().is_empty());
}

#[test]
fn reply_for_another_writer_is_delivered() {
    let domain = Domain::default();
    let client = LocalParticipant::new(&domain);
    let (_requester, replies) = recording_client(&client);
    let (rogue, writer) = rogue_replier(&domain);

    let foreign = CorrelationKey::new(Guid::new(GuidPrefix([4; 12]), 0x102), SequenceNumber(7));
    rogue.publish(writer, encoded_reply(42), Some(foreign)).unwrap();
    EventLoop::new(client).drain();

    assert_eq!(
        *replies.borrow(),
        vec![(foreign, GetControlValueRes { value: 42 })]
    );
}

#[test]
fn replies_pair_up_in_any_arrival_order() {
    let domain = Domain::default();
    let client = LocalParticipant::new(&domain);
    let (requester, replies) = recording_client(&client);
    let (rogue, writer) = rogue_replier(&domain);

    let exposure = requester.send_request(&GetControlValueReq::new("rgb_module.exposure"));
    let gain = requester.send_request(&GetControlValueReq::new("rgb_module.gain"));

    // Answered last request first.
    rogue.publish(writer, encoded_reply(16), Some(gain)).unwrap();
    rogue.publish(writer, encoded_reply(3000), Some(exposure)).unwrap();
    EventLoop::new(client).drain();

    assert_eq!(
        *replies.borrow(),
        vec![
            (gain, GetControlValueRes { value: 16 }),
            (exposure, GetControlValueRes { value: 3000 }),
        ]
    );
}

#[test]
fn shared_service_replies_reach_every_requester() {
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let first = LocalParticipant::new(&domain);
    let second = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let (first_client, first_replies) = recording_client(&first);
    let (second_client, second_replies) = recording_client(&second);

    let server_loop = EventLoop::new(server);
    let first_loop = EventLoop::new(first);
    let second_loop = EventLoop::new(second);

    let exposure = first_client.send_request(&GetControlValueReq::new("rgb_module.exposure"));
    let gain = second_client.send_request(&GetControlValueReq::new("rgb_module.gain"));
    settle(&[&server_loop, &first_loop, &second_loop]);

    for replies in [&first_replies, &second_replies] {
        let keys: Vec<_> = replies.borrow().iter().map(|(key, _)| *key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(&exposure));
        assert!(keys.contains(&gain));
    }
}

#[test]
fn own_replies_only_keeps_requesters_apart() {
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let first = LocalParticipant::new(&domain);
    let second = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let config = RequesterConfig::default().with_own_replies_only(true);
    let (first_client, first_replies) = recording_client_with(&first, config);
    let (second_client, second_replies) = recording_client_with(&second, config);

    let server_loop = EventLoop::new(server);
    let first_loop = EventLoop::new(first);
    let second_loop = EventLoop::new(second);

    let exposure = first_client.send_request(&GetControlValueReq::new("rgb_module.exposure"));
    let gain = second_client.send_request(&GetControlValueReq::new("rgb_module.gain"));
    settle(&[&server_loop, &first_loop, &second_loop]);

    assert_eq!(
        *first_replies.borrow(),
        vec![(exposure, GetControlValueRes { value: 3000 })]
    );
    assert_eq!(
        *second_replies.borrow(),
        vec![(gain, GetControlValueRes { value: 16 })]
    );
}

#[test]
fn responder_skips_disposed_requests() {
    let domain = Domain::default();
    let server = LocalParticipant::new(&domain);
    let client = LocalParticipant::new(&domain);
    let _responder = control_server(&server);
    let (requester, replies) = recording_client(&client);
    let server_loop = EventLoop::new(server);
    let client_loop = EventLoop::new(client.clone());

    client.dispose(requester.writer()).unwrap();
    let key = requester.send_request(&GetControlValueReq::new("rgb_module.gain"));
    settle(&[&server_loop, &client_loop]);

    assert_eq!(
        *replies.borrow(),
        vec![(key, GetControlValueRes { value: 16 })]
    );
}
