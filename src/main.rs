use anyhow::Result;
use clap::Parser;
use std::env;

use divscan::{cli, config, engine, ui};

fn preprocess() {
    dotenv::dotenv().ok();
    env_logger::init();
}

fn client() -> Result<reqwest::Client> {
    let user_agent = env::var("USER_AGENT")
        .unwrap_or_else(|_| format!("divscan/{}", env!("CARGO_PKG_VERSION")));
    let client = reqwest::ClientBuilder::new().user_agent(user_agent).build()?;
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    preprocess();

    let cli = cli::Cli::parse();
    log::debug!("Command line input recorded: {cli:#?}");

    let command = cli
        .command
        .unwrap_or_else(|| cli::Commands::Event(cli::EventArgs::default()));

    match command {
        cli::Commands::Full(args) => {
            let symbols = config::universe(&args.symbols)?;
            log::info!("full run over {} symbols", symbols.len());

            let opts = engine::RunOptions {
                years_for_payout: args.years,
                yield_threshold: args.threshold,
                force_all: false,
            };
            let report = engine::full_mode(&client()?, &symbols, &opts).await;
            ui::print_report(&report, args.threshold, false);
        }

        cli::Commands::Event(args) => {
            let symbols = config::universe(&args.run.symbols)?;
            let state_file = config::state_file();
            log::info!(
                "event run over {} symbols (state: {})",
                symbols.len(),
                state_file.display()
            );

            let opts = engine::RunOptions {
                years_for_payout: args.run.years,
                yield_threshold: args.run.threshold,
                force_all: args.force_all,
            };
            let report = engine::event_mode(&client()?, &symbols, &state_file, &opts).await?;
            ui::print_report(&report, args.run.threshold, true);
        }
    }

    Ok(())
}
