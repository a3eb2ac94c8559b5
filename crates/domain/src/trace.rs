use serde::Serialize;

/// Structured trace events emitted across all xetrace crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TemplateResolved {
        identifier: String,
        path: String,
    },
    StoreCall {
        server: String,
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    SessionCreated {
        name: String,
        server: String,
    },
    SessionSkippedExisting {
        name: String,
        server: String,
    },
    ProvisionFailed {
        target: String,
        reason: String,
    },
    BatchCompleted {
        servers: usize,
        sources: usize,
        created: usize,
        failed: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "xe_event");
    }
}
