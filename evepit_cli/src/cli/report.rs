use clap::{Args, ValueEnum};

use crate::{
    cli::common::{build_aggregator, load_esi_config, refresh_tokens},
    render::TextReport,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Args)]
pub(crate) struct ReportCommand {
    /// Refresh token of a character to report on; repeat for several characters.
    #[arg(long = "refresh-token")]
    refresh_tokens: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

impl ReportCommand {
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let config = load_esi_config()?;
        let tokens = refresh_tokens(&self.refresh_tokens)?;
        let mut aggregator = build_aggregator(&config)?;

        let mut reports = Vec::with_capacity(tokens.len());
        let mut failed = 0_usize;

        for (index, token) in tokens.iter().enumerate() {
            let position = index + 1;
            if let Err(error) = aggregator.session_mut().activate(token).await {
                log::error!(
                    "refresh token #{position} could not be activated: {}",
                    error.display_chain()
                );
                failed += 1;
                continue;
            }

            match aggregator.generate_report().await {
                Ok(report) => match self.format {
                    OutputFormat::Text => print!("{}", TextReport(&report)),
                    OutputFormat::Json => reports.push(report),
                },
                Err(error) => {
                    log::error!(
                        "report for refresh token #{position} failed: {}",
                        error.display_chain()
                    );
                    failed += 1;
                }
            }
        }

        aggregator.session_mut().deactivate();

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }

        if failed > 0 {
            anyhow::bail!(
                "{failed} of {} characters could not be reported",
                tokens.len()
            );
        }
        Ok(())
    }
}
