//! In-memory test doubles for the store capability traits.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use xe_domain::error::{Error, Result};

use crate::store::{ServerConnector, Session, SessionStore};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mock store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A store double backed by a set of pre-existing session names,
/// recording every call for later inspection.
pub(crate) struct MockStore {
    server: String,
    existing: Mutex<HashSet<String>>,
    created: Mutex<Vec<String>>,
    exists_calls: Mutex<Vec<String>>,
    last_template: Mutex<Option<String>>,
    create_error: Option<String>,
}

impl MockStore {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.to_owned(),
            existing: Mutex::new(HashSet::new()),
            created: Mutex::new(Vec::new()),
            exists_calls: Mutex::new(Vec::new()),
            last_template: Mutex::new(None),
            create_error: None,
        }
    }

    pub fn with_existing(self, names: &[&str]) -> Self {
        {
            let mut existing = self.existing.lock().unwrap();
            for name in names {
                existing.insert((*name).to_owned());
            }
        }
        self
    }

    pub fn with_create_error(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_owned());
        self
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn exists_calls(&self) -> Vec<String> {
        self.exists_calls.lock().unwrap().clone()
    }

    pub fn last_template(&self) -> Option<String> {
        self.last_template.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for MockStore {
    fn server(&self) -> &str {
        &self.server
    }

    async fn session_exists(&self, name: &str) -> Result<bool> {
        self.exists_calls.lock().unwrap().push(name.to_owned());
        Ok(self.existing.lock().unwrap().contains(name))
    }

    async fn create_session_from_template(&self, name: &str, template_xml: &str) -> Result<()> {
        if let Some(ref message) = self.create_error {
            return Err(Error::Store {
                server: self.server.clone(),
                message: message.clone(),
            });
        }
        self.existing.lock().unwrap().insert(name.to_owned());
        self.created.lock().unwrap().push(name.to_owned());
        *self.last_template.lock().unwrap() = Some(template_xml.to_owned());
        Ok(())
    }

    async fn get_session(&self, name: &str) -> Result<Session> {
        if !self.existing.lock().unwrap().contains(name) {
            return Err(Error::Store {
                server: self.server.clone(),
                message: format!("no session named {name}"),
            });
        }
        Ok(Session {
            name: name.to_owned(),
            server: self.server.clone(),
            created_at: Utc::now(),
        })
    }
}

#[async_trait]
impl SessionStore for Arc<MockStore> {
    fn server(&self) -> &str {
        self.as_ref().server()
    }

    async fn session_exists(&self, name: &str) -> Result<bool> {
        self.as_ref().session_exists(name).await
    }

    async fn create_session_from_template(&self, name: &str, template_xml: &str) -> Result<()> {
        self.as_ref()
            .create_session_from_template(name, template_xml)
            .await
    }

    async fn get_session(&self, name: &str) -> Result<Session> {
        self.as_ref().get_session(name).await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mock connector
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hands out shared [`MockStore`] handles by server name, optionally
/// refusing some servers to exercise the connection-failure path.
pub(crate) struct MockConnector {
    stores: HashMap<String, Arc<MockStore>>,
    refused: HashSet<String>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self {
            stores: HashMap::new(),
            refused: HashSet::new(),
        }
    }

    pub fn with_store(mut self, store: MockStore) -> Self {
        self.stores
            .insert(store.server().to_owned(), Arc::new(store));
        self
    }

    pub fn with_refused(mut self, server: &str) -> Self {
        self.refused.insert(server.to_owned());
        self
    }

    pub fn store(&self, server: &str) -> &Arc<MockStore> {
        &self.stores[server]
    }
}

#[async_trait]
impl ServerConnector for MockConnector {
    async fn connect(&self, server: &str) -> Result<Box<dyn SessionStore>> {
        if self.refused.contains(server) {
            return Err(Error::Connection {
                server: server.to_owned(),
                message: "connection refused".into(),
            });
        }
        match self.stores.get(server) {
            Some(store) => Ok(Box::new(store.clone())),
            None => Err(Error::Connection {
                server: server.to_owned(),
                message: "unknown server".into(),
            }),
        }
    }
}
