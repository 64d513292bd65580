//! Shared test support: a fake remote end and a scripted transport.

mod fake_remote;
mod stub_transport;

pub(crate) use fake_remote::{FakeRemote, Route, healthy_routes};
pub(crate) use stub_transport::StubTransport;
