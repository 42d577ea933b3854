use anyhow::Context;
use clap::Parser;
use team_plugin_perms::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up the tokio runtime
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

    runtime
        .block_on(team_plugin_perms::run(cli))
        .context("team-plugin-perms failed")
}
