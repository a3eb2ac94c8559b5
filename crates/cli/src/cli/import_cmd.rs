//! CLI wrapper for the batch provisioning workflow.
//!
//!   xetrace import --server db01 --template db_query_wait_stats
//!   xetrace import --server db01 --server db02 --path waits.xml --name QW
//!
//! One outcome line per (server, source) pair; the batch never aborts
//! early on a single item's failure.

use xe_domain::config::Config;
use xe_provision::{batch, BatchRequest};
use xe_store::RestConnector;

use crate::cli::ImportArgs;

pub async fn run(config: Config, args: ImportArgs) -> anyhow::Result<()> {
    let request = BatchRequest {
        servers: args.servers,
        files: args.paths,
        templates: args.templates,
        name: args.name,
        suppress_errors: args.suppress_errors,
    };

    let connector = RestConnector::new(config.store.clone());
    let outcomes = batch::run(&connector, &config.catalog.root, &request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            println!("{}", outcome.render());
        }
    }

    let failures = outcomes.iter().filter(|o| o.is_failure()).count();
    if failures > 0 {
        anyhow::bail!("{failures} of {} item(s) failed", outcomes.len());
    }
    Ok(())
}
