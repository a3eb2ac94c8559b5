pub mod config_cmd;
pub mod import_cmd;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// xetrace — provision diagnostic tracing sessions from XML templates.
#[derive(Debug, Parser)]
#[command(name = "xetrace", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create tracing sessions on target servers from template files or
    /// catalog templates.
    Import(ImportArgs),
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Target server ("host" or "host:port"). Repeatable; servers are
    /// visited in the order given.
    #[arg(long = "server", required = true)]
    pub servers: Vec<String>,

    /// Template file path. Repeatable; mutually exclusive with
    /// --template.
    #[arg(long = "path", conflicts_with = "templates")]
    pub paths: Vec<PathBuf>,

    /// Catalog template identifier. Repeatable; mutually exclusive with
    /// --path.
    #[arg(long = "template")]
    pub templates: Vec<String>,

    /// Session name. Only valid with a single source; defaults to the
    /// file's base name or the catalog identifier.
    #[arg(long)]
    pub name: Option<String>,

    /// Log failures as warnings and omit them from the output.
    #[arg(long)]
    pub suppress_errors: bool,

    /// Emit outcome records as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path specified by `XE_CONFIG` (or
/// `config.toml` by default).  Returns the parsed
/// [`xe_domain::config::Config`] and the path that was used.
pub fn load_config() -> anyhow::Result<(xe_domain::config::Config, String)> {
    let config_path = std::env::var("XE_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        xe_domain::config::Config::default()
    };

    Ok((config, config_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_parses_repeated_servers_and_templates() {
        let cli = Cli::parse_from([
            "xetrace", "import", "--server", "S1", "--server", "S2", "--template",
            "db_query_wait_stats",
        ]);
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.servers, vec!["S1", "S2"]);
                assert_eq!(args.templates, vec!["db_query_wait_stats"]);
                assert!(args.paths.is_empty());
            }
            other => panic!("expected Import, got {other:?}"),
        }
    }

    #[test]
    fn path_and_template_conflict() {
        let result = Cli::try_parse_from([
            "xetrace", "import", "--server", "S1", "--path", "a.xml", "--template", "qw",
        ]);
        assert!(result.is_err());
    }
}
