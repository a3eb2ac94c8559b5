//! The provisioning engine: one attempt per (server, source) pair.

use std::path::Path;

use xe_catalog::{SourceSpec, TemplateDocument};
use xe_domain::error::Error;
use xe_domain::trace::TraceEvent;

use crate::outcome::{FailureKind, ProvisioningOutcome};
use crate::store::SessionStore;

/// Provision one session on one server from one source.
///
/// Never returns an error: every failure is folded into a
/// [`ProvisioningOutcome`] so the caller's loop continues with the next
/// item. The per-attempt document, parsed XML, and name are locals,
/// discarded when the attempt ends.
pub async fn provision(
    store: &dyn SessionStore,
    spec: &SourceSpec,
    catalog_root: &Path,
    explicit_name: Option<&str>,
) -> ProvisioningOutcome {
    let server = store.server().to_owned();

    // Resolve the source. Unknown catalog identifiers fail per pair.
    let source = match spec.resolve(catalog_root) {
        Ok(s) => s,
        Err(e @ Error::UnknownTemplate(_)) => {
            return fail(FailureKind::UnknownTemplate, e.to_string(), spec.describe())
        }
        Err(e) => return fail(FailureKind::Load, e.to_string(), spec.describe()),
    };

    // Load the document bytes.
    let bytes = match source.read() {
        Ok(b) => b,
        Err(e) => {
            return fail(
                FailureKind::Load,
                format!("load error: {e}"),
                source.describe(),
            )
        }
    };

    // Validate the document kind before anything touches the server, so
    // an invalid document wins over a name collision.
    let document = match TemplateDocument::parse(&bytes) {
        Ok(d) => d,
        Err(e) => return fail(FailureKind::InvalidTemplate, e.to_string(), source.describe()),
    };

    // Resolve the session name.
    let name = match explicit_name {
        Some(n) => n.to_owned(),
        None => source.derived_name(),
    };

    // Collision check. An existing name is reported, not silently
    // skipped: the requested provisioning did not happen.
    match store.session_exists(&name).await {
        Ok(true) => {
            TraceEvent::SessionSkippedExisting {
                name: name.clone(),
                server: server.clone(),
            }
            .emit();
            return ProvisioningOutcome::SkippedExisting { name, server };
        }
        Ok(false) => {}
        Err(e) => return fail(FailureKind::Store, e.to_string(), server),
    }

    // Delegate creation. No retry: creation is not idempotent and may be
    // partially applied on failure.
    if let Err(e) = store.create_session_from_template(&name, document.xml()).await {
        return fail(FailureKind::Store, e.to_string(), server);
    }

    // Canonical descriptor of what was just created.
    match store.get_session(&name).await {
        Ok(session) => {
            TraceEvent::SessionCreated {
                name: session.name.clone(),
                server,
            }
            .emit();
            ProvisioningOutcome::Created { session }
        }
        Err(e) => fail(FailureKind::Store, e.to_string(), server),
    }
}

fn fail(kind: FailureKind, reason: String, target: String) -> ProvisioningOutcome {
    TraceEvent::ProvisionFailed {
        target: target.clone(),
        reason: reason.clone(),
    }
    .emit();
    tracing::debug!(target_item = %target, reason = %reason, "provisioning attempt failed");
    ProvisioningOutcome::failed(kind, reason, target)
}
