use anyhow::Context;
use clap::Parser;
use dhub::kernel::config::load_platform_config;
use dhub_cli::{Cli, init_logger, run};
use std::io::{self, Write};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_platform_config(cli.config.as_deref())
        .context("Critical: Configuration is malformed")?;
    let _log = init_logger(&config.logging)?;

    let platform = dhub::bootstrap(&config).context("Platform startup failed")?;

    let mut stdout = io::stdout().lock();
    run(cli.command, &platform, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}
