//! `xe-catalog` — template source resolution for xetrace.
//!
//! A template can be requested as an explicit file path or as an
//! identifier into the curated catalog (a fixed, read-only directory of
//! `<identifier>.xml` files shipped alongside the tool). This crate turns
//! a request into a concrete readable location, derives the default
//! session name from it, and validates that the bytes at that location
//! are a recognized tracing-session document.

pub mod source;
pub mod template;

pub use source::{SourceSpec, TemplateSource, CATALOG_EXTENSION};
pub use template::{TemplateDocument, TEMPLATE_ROOT};
