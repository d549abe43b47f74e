use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = sage_gateway::Args::parse();
	sage_gateway::run(args).await
}
