use clap::{ArgAction, Parser, Subcommand};

use crate::cli::{report::ReportCommand, whoami::WhoamiCommand};

pub(crate) fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Debug, Parser)]
#[command(version = clap::crate_version!(), about = "Planetary interaction reports for EVE Online characters")]
pub(crate) struct CliOpts {
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    subcmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the planetary interaction report for every configured character.
    Report(ReportCommand),

    /// Authenticate each refresh token and show who it belongs to.
    Whoami(WhoamiCommand),
}

impl CliOpts {
    pub(crate) fn verbose(&self) -> u8 {
        self.verbose
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        match &self.subcmd {
            Command::Report(cmd) => cmd.run().await,
            Command::Whoami(cmd) => cmd.run().await,
        }
    }
}
