use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = rapport_api::Args::parse();

	rapport_api::run(args).await
}
