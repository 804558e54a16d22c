use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ltc_api::Args::parse();

	ltc_api::run(args).await
}
