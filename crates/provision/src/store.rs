//! Capability interface over the host database's session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xe_domain::error::Result;

/// Canonical descriptor of a tracing session as reported by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub server: String,
    pub created_at: DateTime<Utc>,
}

/// Abstraction over the host database's session-management surface.
///
/// Implementations may talk to the real management API or a test
/// double. The engine only ever borrows a store handle; constructing
/// and tearing down the underlying connection belongs to the
/// [`ServerConnector`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The server this handle is connected to.
    fn server(&self) -> &str;

    /// Whether a session with this name already exists on the server.
    async fn session_exists(&self, name: &str) -> Result<bool>;

    /// Define a new session from a template document and commit it.
    ///
    /// Not idempotent: callers must not retry a failed creation.
    async fn create_session_from_template(&self, name: &str, template_xml: &str) -> Result<()>;

    /// Fetch the canonical descriptor of an existing session.
    async fn get_session(&self, name: &str) -> Result<Session>;
}

/// Yields one live store handle per target server.
///
/// Connection failures surface here, per server, before any source work
/// starts on that server.
#[async_trait]
pub trait ServerConnector: Send + Sync {
    async fn connect(&self, server: &str) -> Result<Box<dyn SessionStore>>;
}
