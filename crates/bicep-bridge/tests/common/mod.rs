//! Shared test utilities for bridge tests

#![allow(dead_code)]

pub mod fake_cli;
pub mod mock_transport;

pub use fake_cli::FakeCli;
pub use mock_transport::MockTransport;
