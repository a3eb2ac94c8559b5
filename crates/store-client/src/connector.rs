//! Turns a target-server identifier into a live store handle.

use async_trait::async_trait;

use xe_domain::config::StoreConfig;
use xe_domain::error::{Error, Result};
use xe_provision::store::{ServerConnector, SessionStore};

use crate::rest::RestSessionStore;

/// Connects to each target server's management API.
///
/// The batch driver asks for one handle per server and drops it when
/// that server's sources are exhausted.
#[derive(Debug, Clone)]
pub struct RestConnector {
    config: StoreConfig,
}

impl RestConnector {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ServerConnector for RestConnector {
    async fn connect(&self, server: &str) -> Result<Box<dyn SessionStore>> {
        let store = RestSessionStore::new(&self.config, server)?;

        // Probe before handing the store out so an unreachable server
        // fails here, per server, and its sources are skipped.
        store.health().await.map_err(|e| Error::Connection {
            server: server.to_owned(),
            message: e.to_string(),
        })?;

        Ok(Box::new(store))
    }
}
