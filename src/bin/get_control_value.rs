//! Camera control service demo.
//!
//! A server thread answers `GetControlValueReq` with a fixed value; a client
//! thread asks for a control every 100 ms and prints the correlated replies.
//! Both run their own participant and event loop on a shared in-process
//! domain, so they only meet through the derived topic names.
//!
//! Run with `RUST_LOG=debug` to see the request/reply flow and peer matching.

use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sourced_rpc::{
    BitcodeCodec, Deadline, Domain, EventLoop, LocalParticipant, Requester, Responder,
    ServiceDescriptor, SetupError, Timer,
};

const SERVICE_NAME: &str = "d555_poc_get_control_value";
const SERVICE_TYPE_NAME: &str = "GenControlValueSrv_";
const REQUEST_PERIOD: Duration = Duration::from_millis(100);
const ROUNDS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GetControlValueReq {
    control_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GetControlValueRes {
    value: i32,
}

fn run_server(domain: Domain, done: Arc<AtomicBool>) -> Result<(), SetupError> {
    let participant = LocalParticipant::new(&domain);
    let _server = Responder::new(
        &participant,
        ServiceDescriptor::derive(SERVICE_NAME, SERVICE_TYPE_NAME),
        BitcodeCodec::<GetControlValueReq>::new(),
        BitcodeCodec::<GetControlValueRes>::new(),
        |req: &GetControlValueReq| {
            println!("Received request: {}", req.control_name);
            let res = GetControlValueRes { value: 3000 };
            println!("Sending response: {}", res.value);
            res
        },
    )?;

    // Wake up now and then to notice the client has finished.
    EventLoop::new(participant).run_while(|| {
        if done.load(Ordering::Acquire) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(Deadline::after(REQUEST_PERIOD))
        }
    });
    Ok(())
}

fn run_client(domain: Domain) -> Result<(), SetupError> {
    let participant = LocalParticipant::new(&domain);
    let received = Rc::new(Cell::new(0usize));
    let counter = received.clone();

    let client = Requester::new(
        &participant,
        ServiceDescriptor::derive(SERVICE_NAME, SERVICE_TYPE_NAME),
        BitcodeCodec::<GetControlValueReq>::new(),
        BitcodeCodec::<GetControlValueRes>::new(),
        move |request_id, res: GetControlValueRes| {
            println!(
                "Received response ({}) : {}",
                request_id.sequence_number, res.value
            );
            counter.set(counter.get() + 1);
        },
    )?;

    // Requests published before the server's reader exists are lost, so keep
    // asking until enough replies came back.
    let mut request_timer = Timer::new(REQUEST_PERIOD);

    EventLoop::new(participant).run_while(|| {
        if received.get() >= ROUNDS {
            return ControlFlow::Break(());
        }
        if request_timer.is_triggered_and_reset() {
            let request = GetControlValueReq {
                control_name: "rgb_module.exposure".to_string(),
            };
            println!("Getting Control: {}", request.control_name);
            let id = client.send_request(&request);
            println!("Sent request ({}) : {}", id.sequence_number, request.control_name);
        }
        ControlFlow::Continue(request_timer.next_trigger())
    });
    Ok(())
}

fn main() {
    env_logger::init();

    let domain = Domain::default();
    let done = Arc::new(AtomicBool::new(false));

    let server = {
        let domain = domain.clone();
        let done = done.clone();
        thread::spawn(move || run_server(domain, done))
    };

    let client_result = run_client(domain);
    done.store(true, Ordering::Release);

    if let Err(e) = client_result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    match server.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("server thread panicked");
            std::process::exit(1);
        }
    }
}
