use clap::Parser;

use chime_rs::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let settings = cli::load_settings(&cli)?;
    let _log_handle = cli::init_logger_from_settings(&settings)?;

    cli::execute_command(&cli, settings).await?;

    Ok(())
}
