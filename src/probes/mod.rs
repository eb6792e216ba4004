//! Probe primitives: the atomic network operations a scan fans out to.
//!
//! Each probe is stateless per invocation, enforces its own timeout, and
//! converts every failure into a [`crate::error_handling::ProbeError`] at
//! its own boundary so sibling probes are never affected.

pub mod browser;
pub mod dns;
pub mod headers;
pub mod ping;
pub mod ports;
