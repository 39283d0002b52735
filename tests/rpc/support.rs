//! Shared test fixtures: the camera control service and small helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sourced_rpc::{
    BitcodeCodec, CorrelationKey, EventLoop, LocalParticipant, Requester, RequesterConfig,
    Responder, ServiceDescriptor,
};

pub const SERVICE_NAME: &str = "get_value";
pub const SERVICE_TYPE_NAME: &str = "ValueSrv_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetControlValueReq {
    pub control_name: String,
}

impl GetControlValueReq {
    pub fn new(control_name: &str) -> Self {
        Self {
            control_name: control_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetControlValueRes {
    pub value: i32,
}

pub type Replies = Rc<RefCell<Vec<(CorrelationKey, GetControlValueRes)>>>;

pub type ControlClient = Requester<LocalParticipant, BitcodeCodec<GetControlValueReq>>;

pub fn descriptor() -> ServiceDescriptor {
    ServiceDescriptor::derive(SERVICE_NAME, SERVICE_TYPE_NAME)
}

/// Value the test camera reports for a control.
pub fn control_value(control_name: &str) -> i32 {
    match control_name {
        "rgb_module.exposure" => 3000,
        "rgb_module.gain" => 16,
        _ => -1,
    }
}

pub fn control_server(participant: &LocalParticipant) -> Responder {
    Responder::new(
        participant,
        descriptor(),
        BitcodeCodec::<GetControlValueReq>::new(),
        BitcodeCodec::<GetControlValueRes>::new(),
        |req: &GetControlValueReq| GetControlValueRes {
            value: control_value(&req.control_name),
        },
    )
    .unwrap()
}

/// A client that records every reply it receives.
pub fn recording_client(participant: &LocalParticipant) -> (ControlClient, Replies) {
    recording_client_with(participant, RequesterConfig::default())
}

pub fn recording_client_with(
    participant: &LocalParticipant,
    config: RequesterConfig,
) -> (ControlClient, Replies) {
    let replies: Replies = Rc::new(RefCell::new(Vec::new()));
    let sink = replies.clone();
    let client = Requester::with_config(
        participant,
        descriptor(),
        config,
        BitcodeCodec::<GetControlValueReq>::new(),
        BitcodeCodec::<GetControlValueRes>::new(),
        move |key, res: GetControlValueRes| sink.borrow_mut().push((key, res)),
    )
    .unwrap();
    (client, replies)
}

/// Drain every loop until none of them has work left.
pub fn settle(loops: &[&EventLoop<LocalParticipant>]) {
    while loops.iter().map(|l| l.drain()).sum::<usize>() > 0 {}
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
