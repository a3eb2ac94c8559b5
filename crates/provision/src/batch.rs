//! Batch driver: input validation and the servers x sources loop.

use std::path::{Path, PathBuf};

use xe_catalog::SourceSpec;
use xe_domain::error::{Error, Result};
use xe_domain::trace::TraceEvent;

use crate::engine;
use crate::outcome::{FailureKind, ProvisioningOutcome};
use crate::store::ServerConnector;

/// One batch invocation: the cross product of servers x sources.
#[derive(Debug, Clone, Default)]
pub struct BatchRequest {
    /// Target servers, visited in input order.
    pub servers: Vec<String>,
    /// Explicit template files. Mutually exclusive with `templates`.
    pub files: Vec<PathBuf>,
    /// Catalog identifiers. Mutually exclusive with `files`.
    pub templates: Vec<String>,
    /// Explicit session name. Only valid with a single source; multiple
    /// servers reusing one explicit name is intentional and supported.
    pub name: Option<String>,
    /// Report failures as warnings and omit them from the result.
    pub suppress_errors: bool,
}

impl BatchRequest {
    /// Pre-flight validation; runs before any server is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(Error::InvalidRequest(
                "must specify at least one target server".into(),
            ));
        }
        if self.files.is_empty() && self.templates.is_empty() {
            return Err(Error::InvalidRequest(
                "must specify a template file or a catalog template".into(),
            ));
        }
        if !self.files.is_empty() && !self.templates.is_empty() {
            return Err(Error::InvalidRequest(
                "template files and catalog templates are mutually exclusive".into(),
            ));
        }
        // An explicit name would collide across the sessions created
        // from multiple sources. Derived names are fine: each source
        // gets its own.
        if self.name.is_some() && self.source_count() > 1 {
            return Err(Error::InvalidRequest(
                "a session name cannot be specified with multiple sources".into(),
            ));
        }
        Ok(())
    }

    fn source_count(&self) -> usize {
        self.files.len() + self.templates.len()
    }

    fn sources(&self) -> Vec<SourceSpec> {
        if !self.files.is_empty() {
            self.files.iter().cloned().map(SourceSpec::File).collect()
        } else {
            self.templates
                .iter()
                .cloned()
                .map(SourceSpec::Catalog)
                .collect()
        }
    }
}

/// Run the whole batch.
///
/// Servers are visited one at a time, sources one at a time in input
/// order. A connection failure records one outcome for that server and
/// skips its sources; any other failure is recorded per (server,
/// source) pair. Nothing aborts the remaining iterations.
pub async fn run(
    connector: &dyn ServerConnector,
    catalog_root: &Path,
    request: &BatchRequest,
) -> Result<Vec<ProvisioningOutcome>> {
    request.validate()?;

    let sources = request.sources();
    let mut outcomes = Vec::with_capacity(request.servers.len() * sources.len());

    for server in &request.servers {
        let store = match connector.connect(server).await {
            Ok(store) => store,
            Err(e) => {
                outcomes.push(ProvisioningOutcome::failed(
                    FailureKind::Connection,
                    e.to_string(),
                    server.clone(),
                ));
                continue;
            }
        };

        for spec in &sources {
            let outcome =
                engine::provision(store.as_ref(), spec, catalog_root, request.name.as_deref())
                    .await;
            outcomes.push(outcome);
        }
    }

    TraceEvent::BatchCompleted {
        servers: request.servers.len(),
        sources: sources.len(),
        created: outcomes.iter().filter(|o| !o.is_failure()).count(),
        failed: outcomes.iter().filter(|o| o.is_failure()).count(),
    }
    .emit();

    if request.suppress_errors {
        Ok(suppress(outcomes))
    } else {
        Ok(outcomes)
    }
}

/// Suppressed-error mode: failure-class outcomes become warnings and
/// are dropped from the returned sequence. Decision logic upstream is
/// unchanged.
fn suppress(outcomes: Vec<ProvisioningOutcome>) -> Vec<ProvisioningOutcome> {
    outcomes
        .into_iter()
        .filter(|outcome| {
            if outcome.is_failure() {
                tracing::warn!(outcome = %outcome.render(), "provisioning item failed");
                false
            } else {
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConnector, MockStore};
    use std::fs;

    const VALID: &str = r#"<event_sessions><event_session name="s"/></event_sessions>"#;

    fn request(servers: &[&str]) -> BatchRequest {
        BatchRequest {
            servers: servers.iter().map(|s| (*s).to_string()).collect(),
            ..BatchRequest::default()
        }
    }

    #[tokio::test]
    async fn no_sources_is_rejected_before_any_connection() {
        let connector = MockConnector::new().with_refused("S1");
        let err = run(&connector, Path::new("/unused"), &request(&["S1"]))
            .await
            .unwrap_err();
        // The refused connector was never consulted: validation failed
        // first.
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn both_source_forms_are_rejected() {
        let mut req = request(&["S1"]);
        req.files = vec![PathBuf::from("a.xml")];
        req.templates = vec!["qw".into()];
        assert!(req.validate().is_err());
    }

    #[tokio::test]
    async fn explicit_name_with_multiple_sources_is_rejected() {
        let mut req = request(&["S1"]);
        req.templates = vec!["a".into(), "b".into()];
        req.name = Some("QW".into());
        let connector = MockConnector::new();
        let err = run(&connector, Path::new("/unused"), &req).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn explicit_name_with_multiple_servers_is_allowed() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("qw.xml"), VALID).unwrap();

        let connector = MockConnector::new()
            .with_store(MockStore::new("S1"))
            .with_store(MockStore::new("S2"));
        let mut req = request(&["S1", "S2"]);
        req.templates = vec!["qw".into()];
        req.name = Some("QW".into());

        let outcomes = run(&connector, tmp.path(), &req).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| !o.is_failure()));
        assert_eq!(connector.store("S1").created(), vec!["QW"]);
        assert_eq!(connector.store("S2").created(), vec!["QW"]);
    }

    #[tokio::test]
    async fn multiple_sources_each_get_their_own_derived_name() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.xml"), VALID).unwrap();
        fs::write(tmp.path().join("b.xml"), VALID).unwrap();

        let connector = MockConnector::new().with_store(MockStore::new("S1"));
        let mut req = request(&["S1"]);
        req.files = vec![tmp.path().join("a.xml"), tmp.path().join("b.xml")];

        let outcomes = run(&connector, Path::new("/unused"), &req).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(connector.store("S1").created(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn invalid_source_does_not_abort_the_rest_of_the_batch() {
        // Scenario: two servers, a.xml invalid, b.xml valid -> four
        // outcomes, two failed and two created, in input order.
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.xml"), "<wrong_root/>").unwrap();
        fs::write(tmp.path().join("b.xml"), VALID).unwrap();

        let connector = MockConnector::new()
            .with_store(MockStore::new("S1"))
            .with_store(MockStore::new("S2"));
        let mut req = request(&["S1", "S2"]);
        req.files = vec![tmp.path().join("a.xml"), tmp.path().join("b.xml")];

        let outcomes = run(&connector, Path::new("/unused"), &req).await.unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(matches!(
            outcomes[0],
            ProvisioningOutcome::Failed { kind: FailureKind::InvalidTemplate, .. }
        ));
        assert!(matches!(outcomes[1], ProvisioningOutcome::Created { .. }));
        assert!(matches!(
            outcomes[2],
            ProvisioningOutcome::Failed { kind: FailureKind::InvalidTemplate, .. }
        ));
        assert!(matches!(outcomes[3], ProvisioningOutcome::Created { .. }));
        assert_eq!(connector.store("S1").created(), vec!["b"]);
        assert_eq!(connector.store("S2").created(), vec!["b"]);
    }

    #[tokio::test]
    async fn connection_failure_skips_that_server_only() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("qw.xml"), VALID).unwrap();

        let connector = MockConnector::new()
            .with_refused("S1")
            .with_store(MockStore::new("S2"));
        let mut req = request(&["S1", "S2"]);
        req.templates = vec!["qw".into()];

        let outcomes = run(&connector, tmp.path(), &req).await.unwrap();

        // One connection failure for S1 (its sources were skipped), one
        // creation on S2.
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            outcomes[0],
            ProvisioningOutcome::Failed { kind: FailureKind::Connection, .. }
        ));
        assert!(matches!(outcomes[1], ProvisioningOutcome::Created { .. }));
    }

    #[tokio::test]
    async fn unknown_template_yields_one_failure_per_server() {
        let tmp = tempfile::tempdir().unwrap();

        let connector = MockConnector::new().with_store(MockStore::new("S1"));
        let mut req = request(&["S1"]);
        req.templates = vec!["does_not_exist".into()];

        let outcomes = run(&connector, tmp.path(), &req).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            ProvisioningOutcome::Failed { kind, target, .. } => {
                assert_eq!(*kind, FailureKind::UnknownTemplate);
                assert_eq!(target, "does_not_exist");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn suppress_mode_omits_failures_but_keeps_successes() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.xml"), "<wrong_root/>").unwrap();
        fs::write(tmp.path().join("b.xml"), VALID).unwrap();

        let connector = MockConnector::new().with_store(MockStore::new("S1"));
        let mut req = request(&["S1"]);
        req.files = vec![tmp.path().join("a.xml"), tmp.path().join("b.xml")];
        req.suppress_errors = true;

        let outcomes = run(&connector, Path::new("/unused"), &req).await.unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], ProvisioningOutcome::Created { .. }));
    }
}
