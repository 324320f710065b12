//! tfinv CLI
//!
//! Builds a dynamic host inventory from an infrastructure state document read
//! from a file, stdin, or Consul KV, and prints it as JSON on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use tfinv_core::{OutputFormat, State, convert};
use tfinv_source::{ConsulSource, FileSource, StateSource};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "tfinv", version)]
#[command(about = "Build a dynamic host inventory from infrastructure state", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Inventory representation (flat or tree)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Project name exposed as the `project` variable of `all`
    #[arg(long, global = true)]
    project: Option<String>,

    /// Host resource prefix (repeatable, replaces configured prefixes)
    #[arg(long = "prefix", global = true)]
    prefixes: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a state file, or stdin when no file or `-` is given
    #[command(name = "convert")]
    Convert {
        /// Path to the state document
        #[arg(default_value = "-")]
        state: PathBuf,
    },

    /// Fetch the state from Consul KV and convert it
    #[command(name = "consul")]
    Consul {
        /// Consul agent HTTP address
        #[arg(long)]
        address: Option<String>,

        /// Key prefix; the state is read from `<prefix>:<project>`
        #[arg(long)]
        key_prefix: Option<String>,

        /// Datacenter to query
        #[arg(long)]
        datacenter: Option<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    fn apply(&self, config: &mut Config) {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(project) = &self.project {
            config.project = Some(project.clone());
        }
        if !self.prefixes.is_empty() {
            config.classifier.prefixes.clone_from(&self.prefixes);
        }
        if let Commands::Consul {
            address,
            key_prefix,
            datacenter,
        } = &self.command
        {
            if let Some(address) = address {
                config.consul.address.clone_from(address);
            }
            if let Some(prefix) = key_prefix {
                config.consul.prefix.clone_from(prefix);
            }
            if datacenter.is_some() {
                config.consul.datacenter.clone_from(datacenter);
            }
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    // stdout is reserved for the inventory
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_source(cli: &Cli, config: &Config) -> Result<Box<dyn StateSource>> {
    match &cli.command {
        Commands::Convert { state } => Ok(Box::new(FileSource::new(state))),
        Commands::Consul { .. } => {
            let project = config
                .project
                .as_deref()
                .ok_or_else(|| eyre!("consul source needs a project (--project or `project` in config)"))?;

            let mut source = ConsulSource::new(&config.consul.address, &config.consul.prefix, project)
                .wrap_err("invalid consul address")?;
            if let Some(dc) = &config.consul.datacenter {
                source = source.with_datacenter(dc);
            }
            if let Some(token) = &config.consul.token {
                source = source.with_token(token);
            }
            Ok(Box::new(source))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let (mut config, config_path) = Config::load_default(cli.config.as_deref())?;
    cli.apply(&mut config);

    init_tracing(&config, cli.verbose);

    match &config_path {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => warn!("no config file found, using defaults"),
    }

    let source = build_source(&cli, &config)?;

    let bytes = source
        .fetch()
        .await
        .wrap_err_with(|| format!("failed to read state from {}", source.describe()))?;

    let state = State::from_json(&bytes)
        .wrap_err_with(|| format!("failed to decode state from {}", source.describe()))?;

    let inventory = convert(&state, &config.options()).wrap_err("failed to build inventory")?;

    info!(
        groups = inventory.group_names().len(),
        hosts = inventory.host_count(),
        format = %config.format,
        "writing inventory"
    );

    println!("{}", inventory.to_json(config.format, true)?);

    Ok(())
}
