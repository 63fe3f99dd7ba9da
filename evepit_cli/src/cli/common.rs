use std::env;

use anyhow::Context;
use evepit_app::PiAggregator;
use evepit_esi::{EsiConfig, EveClient, Session};

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("evepit/", env!("CARGO_PKG_VERSION"));

pub(crate) fn load_esi_config() -> anyhow::Result<EsiConfig> {
    let mut config = EsiConfig::new(
        required_env("EVE_CLIENT_ID")?,
        required_env("EVE_CLIENT_SECRET")?,
        env::var("EVEPIT_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_owned()),
    );
    if let Ok(callback_url) = env::var("EVE_CALLBACK_URL") {
        config.callback_url = callback_url;
    }
    if let Ok(base_url) = env::var("EVEPIT_ESI_BASE_URL") {
        config.base_url = base_url;
    }

    config.validate().context("invalid ESI configuration")?;
    Ok(config)
}

/// Tokens given on the command line win over `EVE_REFRESH_TOKENS`.
pub(crate) fn refresh_tokens(explicit: &[String]) -> anyhow::Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let raw = env::var("EVE_REFRESH_TOKENS").context(
        "no refresh tokens; pass --refresh-token or set EVE_REFRESH_TOKENS to a JSON array",
    )?;
    parse_refresh_tokens(&raw)
}

pub(crate) fn build_aggregator(config: &EsiConfig) -> anyhow::Result<PiAggregator<EveClient>> {
    let client = EveClient::new(config.clone()).context("failed to create ESI client")?;
    Ok(PiAggregator::new(Session::new(client)))
}

fn parse_refresh_tokens(raw: &str) -> anyhow::Result<Vec<String>> {
    let tokens: Vec<String> = serde_json::from_str(raw)
        .context("EVE_REFRESH_TOKENS must be a JSON array of strings")?;
    let tokens: Vec<String> = tokens
        .into_iter()
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() {
        anyhow::bail!("EVE_REFRESH_TOKENS does not contain any refresh token");
    }
    Ok(tokens)
}

fn required_env(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow::anyhow!("missing required env var `{name}`"))
}

#[cfg(test)]
mod tests {
    use super::{parse_refresh_tokens, refresh_tokens};

    #[test]
    fn refresh_tokens_parse_from_json_array() {
        let tokens = parse_refresh_tokens(r#"["abc", " def ", ""]"#).expect("valid list");
        assert_eq!(tokens, vec!["abc", "def"]);
    }

    #[test]
    fn refresh_tokens_reject_non_array() {
        assert!(parse_refresh_tokens(r#""abc""#).is_err());
        assert!(parse_refresh_tokens("[]").is_err());
    }

    #[test]
    fn explicit_tokens_take_priority() {
        let explicit = vec!["from-cli".to_string()];
        assert_eq!(
            refresh_tokens(&explicit).expect("explicit tokens"),
            vec!["from-cli"]
        );
    }
}
