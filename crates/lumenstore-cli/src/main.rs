//! lumen-vars - namespaced variables backed by a LumenStore driver.
//!
//! ```text
//! lumen-vars set network public
//! lumen-vars set --ttl 300 session abc123
//! lumen-vars get network
//! lumen-vars --ns prod del network
//! ```

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;

use lumenstore_cli::settings::{self, Settings, NAMESPACE_ENV, STORE_ENV};
use lumenstore_cli::Vars;

#[derive(Parser)]
#[command(name = "lumen-vars")]
#[command(version)]
#[command(about = "Get and set namespaced variables in a LumenStore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose/debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Namespace to use (default)
    #[arg(long, global = true, env = NAMESPACE_ENV)]
    ns: Option<String>,

    /// Store as driver:params (file:$HOME/.lumen-data.yml)
    #[arg(long, global = true, env = STORE_ENV)]
    store: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set a variable
    Set {
        key: String,
        value: String,
        /// Seconds until the variable expires (0 = never)
        #[arg(long, default_value_t = 0)]
        ttl: u64,
    },
    /// Print a variable
    Get { key: String },
    /// Delete a variable
    Del { key: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let home = settings::home_dir();
    let settings = Settings::resolve(cli.store.as_deref(), cli.ns.as_deref(), home.as_deref())?;
    debug!("using storage driver {} with {}", settings.store.driver, settings.store.params);

    let vars = Vars::open(&settings.store, settings.namespace.clone())
        .with_context(|| format!("could not initialize store {}", settings.store))?;

    match cli.command {
        Commands::Set { key, value, ttl } => {
            vars.set_var_with_ttl(&key, &value, Duration::from_secs(ttl))
                .with_context(|| format!("could not set {}", key))?;
        }
        Commands::Get { key } => match vars.get_var(&key) {
            Ok(value) => println!("{}", value),
            Err(e) if e.is_not_found() => {
                eprintln!("{}", e);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e).with_context(|| format!("could not get {}", key)),
        },
        Commands::Del { key } => {
            vars.del_var(&key)
                .with_context(|| format!("could not delete {}", key))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
