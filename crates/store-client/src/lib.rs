//! `xe-store` — REST client for a host database's session-management
//! API.
//!
//! This crate provides:
//! - [`RestSessionStore`], the [`xe_provision::SessionStore`]
//!   implementation that translates every capability call into the
//!   corresponding HTTP request against one target server.
//! - [`RestConnector`], which turns a target-server identifier
//!   (`host` or `host:port`) into a live store handle, probing the
//!   server so connection failures surface before any source work.
//!
//! Read-only calls retry with exponential back-off on transient (5xx /
//! timeout) failures; session creation is sent exactly once.

pub mod connector;
pub mod rest;

pub use connector::RestConnector;
pub use rest::RestSessionStore;
