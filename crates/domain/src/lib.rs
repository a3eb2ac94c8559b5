//! `xe-domain` — shared types for xetrace: the error enum, the TOML
//! configuration, and structured trace events.

pub mod config;
pub mod error;
pub mod trace;
