//! REST implementation of [`SessionStore`].
//!
//! `RestSessionStore` wraps a `reqwest::Client` bound to one target
//! server's management API. Read-only calls go through a retry engine
//! with exponential back-off; creation is sent exactly once because the
//! management API does not guarantee idempotent session definition.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use xe_domain::config::StoreConfig;
use xe_domain::error::{Error, Result};
use xe_domain::trace::TraceEvent;
use xe_provision::store::{Session, SessionStore};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    name: &'a str,
    template: &'a str,
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    name: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A management-API client bound to one target server.
///
/// Created by [`crate::RestConnector::connect`] and dropped once the
/// server's sources are exhausted; the provisioning engine only ever
/// borrows it.
#[derive(Debug, Clone)]
pub struct RestSessionStore {
    http: Client,
    server: String,
    base_url: String,
    api_key: Option<String>,
    max_read_retries: u32,
}

impl RestSessionStore {
    /// Build a client for `server` (`host` or `host:port`; the config
    /// port fills in when none is given).
    pub fn new(cfg: &StoreConfig, server: &str) -> Result<Self> {
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        let authority = if server.contains(':') {
            server.to_owned()
        } else {
            format!("{server}:{}", cfg.port)
        };
        let base_url = format!("{}://{authority}", cfg.scheme);

        let api_key = std::env::var(&cfg.api_key_env).ok();

        Ok(Self {
            http,
            server: server.to_owned(),
            base_url,
            api_key,
            max_read_retries: cfg.max_read_retries,
        })
    }

    /// Probe the management API. Used by the connector so an
    /// unreachable server fails before any source work starts.
    pub async fn health(&self) -> Result<()> {
        let url = self.url("/api/health");
        let resp = self
            .execute_read_with_retry("GET /api/health", || self.http.get(&url))
            .await?;
        self.check_status("GET /api/health", resp).await?;
        Ok(())
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Decorate a `RequestBuilder` with the standard xetrace headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        let mut rb = rb
            .header("X-Client-Type", "xetrace")
            .header("X-Trace-Id", &trace_id);

        if let Some(ref key) = self.api_key {
            rb = rb.header("X-Api-Key", key);
        }
        rb
    }

    /// Build the full URL for a path like `/api/sessions`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// One decorated request, no retry. Creation goes through here.
    async fn execute_once(&self, endpoint: &str, rb: RequestBuilder) -> Result<Response> {
        let start = Instant::now();
        let result = self.decorate(rb).send().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(resp) => {
                TraceEvent::StoreCall {
                    server: self.server.clone(),
                    endpoint: endpoint.to_owned(),
                    status: resp.status().as_u16(),
                    duration_ms,
                }
                .emit();
                Ok(resp)
            }
            Err(e) => {
                TraceEvent::StoreCall {
                    server: self.server.clone(),
                    endpoint: endpoint.to_owned(),
                    status: 0,
                    duration_ms,
                }
                .emit();
                Err(from_reqwest(e))
            }
        }
    }

    /// Execute a read-only request with retry + exponential back-off.
    ///
    /// * Retries on 5xx status codes and on transport errors/timeouts.
    /// * Returns any non-5xx response as-is — callers interpret 4xx
    ///   (the existence probe needs the raw 404).
    /// * Creation must never go through here.
    async fn execute_read_with_retry(
        &self,
        endpoint: &str,
        build_request: impl Fn() -> RequestBuilder + Send + Sync,
    ) -> Result<Response> {
        let mut last_err: Option<Error> = None;

        for attempt in 0..=self.max_read_retries {
            if attempt > 0 {
                let backoff = Duration::from_millis(100 * 2u64.pow(attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            match self.execute_once(endpoint, build_request()).await {
                Ok(resp) if resp.status().is_server_error() => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    last_err = Some(Error::Store {
                        server: self.server.clone(),
                        message: format!("{endpoint} returned {status}: {body}"),
                    });
                    continue;
                }
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Store {
            server: self.server.clone(),
            message: format!("{endpoint}: all retries exhausted"),
        }))
    }

    /// Map a non-success response to a store error.
    async fn check_status(&self, endpoint: &str, resp: Response) -> Result<Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!(
                "{endpoint} auth failed ({status}): {body}"
            )));
        }
        Err(Error::Store {
            server: self.server.clone(),
            message: format!("{endpoint} returned {status}: {body}"),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl SessionStore for RestSessionStore {
    fn server(&self) -> &str {
        &self.server
    }

    async fn session_exists(&self, name: &str) -> Result<bool> {
        let url = self.url(&format!("/api/sessions/{name}"));
        let resp = self
            .execute_read_with_retry("GET /api/sessions/{name}", || self.http.get(&url))
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.check_status("GET /api/sessions/{name}", resp).await?;
        Ok(true)
    }

    async fn create_session_from_template(&self, name: &str, template_xml: &str) -> Result<()> {
        let url = self.url("/api/sessions");
        let req = CreateSessionRequest {
            name,
            template: template_xml,
        };

        // Single attempt: a failed creation may be partially applied.
        let resp = self
            .execute_once("POST /api/sessions", self.http.post(&url).json(&req))
            .await?;
        self.check_status("POST /api/sessions", resp).await?;
        Ok(())
    }

    async fn get_session(&self, name: &str) -> Result<Session> {
        let url = self.url(&format!("/api/sessions/{name}"));
        let resp = self
            .execute_read_with_retry("GET /api/sessions/{name}", || self.http.get(&url))
            .await?;
        let resp = self.check_status("GET /api/sessions/{name}", resp).await?;

        let body = resp.text().await.map_err(from_reqwest)?;
        let session: SessionBody = serde_json::from_str(&body).map_err(|e| Error::Store {
            server: self.server.clone(),
            message: format!("failed to parse session response: {e}: {body}"),
        })?;

        Ok(Session {
            name: session.name,
            server: self.server.clone(),
            created_at: session.created_at,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Http`.
fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_fills_in_when_server_has_none() {
        let cfg = StoreConfig::default();
        let store = RestSessionStore::new(&cfg, "db01.example.com").unwrap();
        assert_eq!(store.base_url, "http://db01.example.com:9433");
        assert_eq!(store.server(), "db01.example.com");
    }

    #[test]
    fn explicit_port_in_server_spec_wins() {
        let cfg = StoreConfig::default();
        let store = RestSessionStore::new(&cfg, "db01.example.com:7001").unwrap();
        assert_eq!(store.base_url, "http://db01.example.com:7001");
    }

    #[test]
    fn scheme_comes_from_config() {
        let cfg = StoreConfig {
            scheme: "https".into(),
            ..StoreConfig::default()
        };
        let store = RestSessionStore::new(&cfg, "db01").unwrap();
        assert_eq!(store.base_url, "https://db01:9433");
    }
}
