//! guiscript command line runner
//!
//! Runs or validates the action lists of a script file against a dry-run
//! backend that logs every side effect.
//!
//! # Usage
//!
//! ```bash
//! # Run one entry as a player
//! guiscript run --script menu.yml --entry reward --player Alex --placeholder rank=gold
//!
//! # Check every action in a script without running anything
//! guiscript validate --script menu.yml
//!
//! # List the registered action types
//! guiscript types
//! ```

mod console;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use console::ConsoleBackend;
use gs_config::{EngineConfig, ScriptFile};
use gs_core::{ActionContext, Actor};
use gs_engine::ActionExecutor;
use gs_services::{MessageCatalog, Services, StaticCatalog};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "guiscript")]
#[command(version)]
#[command(about = "Run and validate guiscript action files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (YAML)
    #[arg(long, short, global = true, env = "GUISCRIPT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the actions of one script entry
    Run {
        /// Script file mapping entry names to action lists
        #[arg(long, short)]
        script: PathBuf,

        /// Entry to run
        #[arg(long, short)]
        entry: String,

        /// Name of the acting player
        #[arg(long, short, default_value = "Player")]
        player: String,

        /// Placeholder value as name=value (repeatable)
        #[arg(long = "placeholder", value_parser = parse_key_value)]
        placeholders: Vec<(String, String)>,

        /// Granted permission node (repeatable)
        #[arg(long = "permission")]
        permissions: Vec<String>,

        /// Starting balance of the player
        #[arg(long, default_value_t = 0.0)]
        balance: f64,

        /// Locale used to render results
        #[arg(long)]
        locale: Option<String>,
    },

    /// Validate every action of a script without running it
    Validate {
        #[arg(long, short)]
        script: PathBuf,
    },

    /// List registered action types
    Types,
}

/// Parse `name=value`
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing placeholder name in '{}'", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading engine config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            script,
            entry,
            player,
            placeholders,
            permissions,
            balance,
            locale,
        } => {
            let backend = ConsoleBackend::new()
                .with_permissions(permissions)
                .with_placeholders(placeholders)
                .with_balance(&player, balance);
            run(config, &script, &entry, &player, locale, backend).await
        }
        Commands::Validate { script } => validate(config, &script),
        Commands::Types => {
            list_types(config);
            Ok(())
        }
    }
}

async fn run(
    config: EngineConfig,
    script: &Path,
    entry: &str,
    player: &str,
    locale: Option<String>,
    backend: ConsoleBackend,
) -> Result<()> {
    let script = ScriptFile::load(script)?;
    let raws = script
        .get(entry)
        .ok_or_else(|| anyhow!("no entry named '{}' in script", entry))?;

    let executor = ActionExecutor::with_builtin_handlers(
        Services::from_backend(Arc::new(backend)),
        config,
    );
    let actor = match &locale {
        Some(locale) => Actor::new(player).with_locale(locale.as_str()),
        None => Actor::new(player),
    };

    info!(entry, actions = raws.len(), player, "Running entry");
    let definition = executor.parse_definition(raws);
    let result = executor
        .execute_action(&actor, &definition, &ActionContext::new())
        .await;

    let catalog = StaticCatalog::new();
    println!(
        "[{}] {}",
        result.status.as_str(),
        catalog.render_result(&result, locale.as_deref())
    );

    let report = executor.shutdown().await;
    if report.aborted > 0 {
        warn!(aborted = report.aborted, "Scheduled actions were cut short");
    }

    if !result.success {
        bail!("entry '{}' failed", entry);
    }
    Ok(())
}

fn validate(config: EngineConfig, script: &Path) -> Result<()> {
    let script = ScriptFile::load(script)?;
    let executor = ActionExecutor::with_builtin_handlers(
        Services::from_backend(Arc::new(ConsoleBackend::new())),
        config,
    );

    let mut invalid = 0;
    for (name, raws) in script.iter() {
        for (index, raw) in raws.iter().enumerate() {
            if let Err(err) = executor.validate(raw) {
                invalid += 1;
                println!("{}[{}]: {}", name, index, err);
            }
        }
    }

    if invalid > 0 {
        bail!("{} invalid action(s)", invalid);
    }
    println!("{} entries OK", script.len());
    Ok(())
}

fn list_types(config: EngineConfig) {
    let executor = ActionExecutor::with_builtin_handlers(
        Services::from_backend(Arc::new(ConsoleBackend::new())),
        config,
    );
    let registry = executor.registry();

    for name in registry.types() {
        let Some(handler) = registry.lookup(&name) else {
            continue;
        };
        if handler.type_name() != name {
            println!("{:<12} alias of {}", name, handler.type_name());
            continue;
        }
        println!("{:<12} {}", name, handler.describe());
        for example in handler.usage_examples() {
            println!("{:<12}   {}", "", example);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("rank=gold").unwrap(),
            ("rank".to_string(), "gold".to_string())
        );
        assert_eq!(
            parse_key_value("motd=a=b").unwrap(),
            ("motd".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("rank").is_err());
        assert!(parse_key_value("=gold").is_err());
    }

    #[test]
    fn test_validate_reports_invalid_actions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "good: 'message:hi'").unwrap();
        writeln!(file, "bad:").unwrap();
        writeln!(file, "  - 'delay:30001'").unwrap();
        writeln!(file, "  - 'foobar:x'").unwrap();

        let err = validate(EngineConfig::default(), file.path()).unwrap_err();
        assert!(err.to_string().contains("2 invalid"));
    }

    #[tokio::test]
    async fn test_run_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "reward:").unwrap();
        writeln!(file, "  - 'message:Well done {{player}}'").unwrap();
        writeln!(file, "  - 'economy:add:25'").unwrap();

        let path = file.path();
        run(EngineConfig::default(), path, "reward", "Alex", None, ConsoleBackend::new())
            .await
            .unwrap();

        assert!(run(EngineConfig::default(), path, "missing", "Alex", None, ConsoleBackend::new())
            .await
            .is_err());
    }
}
