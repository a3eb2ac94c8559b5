/// Shared error type used across all xetrace crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML: {0}")]
    Xml(String),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    #[error("invalid template document: {0}")]
    InvalidTemplate(String),

    #[error("store {server}: {message}")]
    Store { server: String, message: String },

    #[error("connection to {server} failed: {message}")]
    Connection { server: String, message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
