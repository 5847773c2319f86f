use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use scout_storage::{db::Db, queries, schema};

#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE", required_unless_present = "print")]
	pub config: Option<PathBuf>,
	/// Print the rendered schema instead of applying it.
	#[arg(long)]
	pub print: bool,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	if args.print {
		print!("{}", schema::render_schema());

		return Ok(());
	}

	let path = args.config.ok_or_else(|| eyre::eyre!("--config is required to apply the schema."))?;
	let config = scout_config::load(&path)?;

	init_tracing(&config);

	let storage = config
		.storage
		.as_ref()
		.ok_or_else(|| eyre::eyre!("storage.postgres must be configured to apply the schema."))?;
	let db = Db::connect(&storage.postgres).await?;

	tracing::info!(pool_max_conns = storage.postgres.pool_max_conns, "Connected to Postgres.");

	db.ensure_schema().await?;

	for table in schema::TABLES {
		let rows = queries::count_rows(&db, table).await?;

		tracing::info!(table, rows, "Table ready.");
	}

	let seeded = queries::get_topic(&db, schema::SEED_SESSION_ID).await?.is_some();

	if !seeded {
		return Err(eyre::eyre!("Seed topic {:?} is missing after bootstrap.", schema::SEED_SESSION_ID));
	}

	tracing::info!("Schema applied.");

	Ok(())
}

fn init_tracing(config: &scout_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
	use clap::{CommandFactory, Parser};

	use super::Args;

	#[test]
	fn args_are_well_formed() {
		Args::command().debug_assert();
	}

	#[test]
	fn config_is_required_unless_printing() {
		assert!(Args::try_parse_from(["scout-migrate"]).is_err());

		let print = Args::try_parse_from(["scout-migrate", "--print"]).expect("Arguments must parse.");

		assert!(print.print);
		assert!(print.config.is_none());

		let apply =
			Args::try_parse_from(["scout-migrate", "-c", "scout.toml"]).expect("Arguments must parse.");

		assert!(!apply.print);
		assert_eq!(apply.config, Some(std::path::PathBuf::from("scout.toml")));
	}
}
