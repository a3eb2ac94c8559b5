//! Per-(server, source) provisioning outcomes.

use serde::Serialize;

use crate::store::Session;

/// Why a provisioning attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connection,
    Load,
    InvalidTemplate,
    UnknownTemplate,
    Store,
}

/// The result of one (server, source) provisioning attempt.
///
/// A batch of N servers and M sources emits up to N x M of these; the
/// batch never aborts early on one item's failure.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisioningOutcome {
    /// The session was created; carries the store's canonical descriptor.
    Created { session: Session },
    /// A session with the resolved name already existed on the server.
    /// Failure-class: the requested provisioning did not happen.
    SkippedExisting { name: String, server: String },
    /// The attempt failed; the batch continues with the next item.
    Failed {
        kind: FailureKind,
        reason: String,
        target: String,
    },
}

impl ProvisioningOutcome {
    pub fn failed(kind: FailureKind, reason: impl Into<String>, target: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            reason: reason.into(),
            target: target.into(),
        }
    }

    /// Everything except `Created` counts as a failure for exit-code and
    /// suppress-mode purposes.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Created { .. })
    }

    /// One-line human-readable rendering.
    pub fn render(&self) -> String {
        match self {
            Self::Created { session } => {
                format!("created {} on {}", session.name, session.server)
            }
            Self::SkippedExisting { name, server } => {
                format!("skipped {name} on {server}: session already exists")
            }
            Self::Failed { reason, target, .. } => {
                format!("failed {target}: {reason}")
            }
        }
    }
}
