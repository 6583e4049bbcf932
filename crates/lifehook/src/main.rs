use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = cli::Cli::parse();

    match parsed.dispatch().await {
        Ok(()) => Ok(()),
        Err(err) => {
            // Hook failures were already reported on stdout
            if let Some(exit) = err.downcast_ref::<commands::run::HookExitCode>() {
                std::process::exit(exit.0);
            }
            Err(err)
        }
    }
}
