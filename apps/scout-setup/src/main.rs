use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = scout_setup::Args::parse();
	scout_setup::run(args).await
}
