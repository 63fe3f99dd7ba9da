use std::fmt::{self, Write};

use clap::Args;
use evepit_esi::{Clock, Session, SsoClient};

use crate::cli::common::{build_aggregator, load_esi_config, refresh_tokens};

#[derive(Debug, Args)]
pub(crate) struct WhoamiCommand {
    #[arg(long = "refresh-token")]
    refresh_tokens: Vec<String>,
}

impl WhoamiCommand {
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let config = load_esi_config()?;
        let tokens = refresh_tokens(&self.refresh_tokens)?;
        let mut aggregator = build_aggregator(&config)?;

        let mut out = String::new();
        let failed = describe_tokens(aggregator.session_mut(), &tokens, &mut out).await?;
        print!("{out}");

        if failed > 0 {
            anyhow::bail!(
                "{failed} of {} refresh tokens could not be activated",
                tokens.len()
            );
        }
        Ok(())
    }
}

/// Activates each token in turn and writes the character it resolves to.
/// Tokens that fail are logged and skipped; returns how many failed.
async fn describe_tokens<C, T>(
    session: &mut Session<C, T>,
    tokens: &[String],
    out: &mut impl Write,
) -> Result<usize, fmt::Error>
where
    C: SsoClient,
    T: Clock,
{
    let mut failed = 0_usize;

    for (index, token) in tokens.iter().enumerate() {
        let position = index + 1;
        let principal = match session.activate(token).await {
            Ok(principal) => principal,
            Err(error) => {
                log::error!(
                    "refresh token #{position} could not be activated: {}",
                    error.display_chain()
                );
                failed += 1;
                continue;
            }
        };

        writeln!(out, "Token #{position}")?;
        writeln!(out, "Character: {}", principal.character_id)?;
        writeln!(out, "Name: {}", principal.character_name)?;
        writeln!(out, "Scopes: {}", principal.scopes.join(","))?;
    }

    session.deactivate();
    Ok(failed)
}
