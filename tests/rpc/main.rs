//! Request/reply integration tests over the in-process domain.

mod support;
mod correlation;
mod round_trip;
