//! Application initialization and resource setup.
//!
//! Functions to initialize the shared resources every scan uses:
//! - HTTP clients (adapter client and the limited-redirect header client)
//! - DNS resolver
//! - Logger
//!
//! All initialization functions return proper error types for error
//! handling.

mod client;
mod logger;
mod resolver;

pub use client::{init_client, init_header_client};
pub use logger::init_logger_with;
pub use resolver::init_resolver;
