use clap::Parser;
use libris_rs::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};
use libris_rs::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    execute_command(&cli, settings.clone()).await?;

    if cli.starts_server() {
        Server::new(settings).in_memory(cli.in_memory()).run().await?;
    }

    Ok(())
}
