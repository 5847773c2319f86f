use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = scout_migrate::Args::parse();
	scout_migrate::run(args).await
}
