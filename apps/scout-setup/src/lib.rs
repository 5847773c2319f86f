pub mod env;
pub mod orchestrator;
pub mod probe;
pub mod resolve;
pub mod runner;
pub mod stage;
pub mod venv;

mod error;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use crate::{
	env::Environment,
	orchestrator::Orchestrator,
	resolve::{FollowUpLinks, GcloudResolver},
	runner::ProcessRunner,
};

pub const DEFAULT_CONFIG_FILE: &str = "scout.toml";

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	/// Project root. Defaults to the current directory.
	#[arg(long, value_name = "DIR")]
	pub root: Option<PathBuf>,
	/// Defaults to `scout.toml` under the project root when that file exists.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Check that a deployed revision is healthy and serves every expected route.
	Probe {
		/// Base URL to probe. Defaults to the resolved service address.
		#[arg(long, value_name = "URL")]
		url: Option<String>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let root = match args.root {
		Some(root) => std::path::absolute(root)?,
		None => std::env::current_dir()?,
	};
	let mut config = load_config(&root, args.config.as_deref())?;

	init_tracing(&config);

	let mut env = Environment::load(&root.join(&config.setup.env_file))?;

	config.deploy.apply_env(|key| env.lookup(key));
	scout_config::validate(&config)?;
	env.export_deploy(&config.deploy);

	match args.command {
		None => {
			let orchestrator = Orchestrator::new(
				root,
				config.setup,
				config.deploy,
				env,
				ProcessRunner,
				GcloudResolver,
			);
			let report = orchestrator.run().await?;

			for warning in &report.warnings {
				eprintln!("warning: {warning}");
			}

			println!("Setup completed successfully.");
			println!("{}", report.links);
		},
		Some(Command::Probe { url }) => {
			let base_url = match url {
				Some(url) => url,
				None => FollowUpLinks::resolve(&GcloudResolver, &config.deploy).await.app,
			};
			let report = probe::probe(&base_url, &config.verify).await?;

			println!("{}/health returned {}.", report.base_url, report.health_status);
			println!("{} paths registered.", report.registered);

			if !report.is_healthy() {
				return Err(eyre::eyre!(
					"Deployed service is missing expected paths: {}.",
					report.missing.join(", ")
				));
			}

			println!("All expected paths are registered.");
		},
	}

	Ok(())
}

/// An explicit path must exist. Otherwise `scout.toml` under the root is used when present,
/// and built-in defaults when not.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<scout_config::Config> {
	if let Some(path) = explicit {
		return Ok(scout_config::load(path)?);
	}

	let default_path = root.join(DEFAULT_CONFIG_FILE);

	if default_path.is_file() {
		return Ok(scout_config::load(&default_path)?);
	}

	Ok(scout_config::Config::default())
}

fn init_tracing(config: &scout_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
