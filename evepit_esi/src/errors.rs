use std::fmt;

use thiserror::Error;

pub type EsiResult<T> = Result<T, EsiError>;

#[derive(Debug, Error)]
pub enum EsiError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("no active character; activate a session first")]
    NotAuthenticated,
    #[error("authentication failed")]
    AuthenticationFailed {
        #[source]
        source: Box<EsiError>,
    },
    #[error("[Code {status}]: {body}")]
    RemoteCallFailed { status: u16, body: String },
    #[error("malformed response from {context}")]
    MalformedResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("response from {0} carried no payload")]
    MissingPayload(String),
    #[error("http transport failed")]
    Http(#[from] reqwest::Error),
    #[error("sso operation failed")]
    Rfesi(#[from] rfesi::prelude::EsiError),
    #[error("invalid access token: {0}")]
    InvalidAccessToken(String),
    #[error("access token signature rejected")]
    TokenSignature(#[from] jsonwebtoken::errors::Error),
    #[error("could not load sso signing keys: {0}")]
    SigningKeys(String),
    #[error("invalid token subject format: {0}")]
    InvalidTokenSubject(String),
    #[error("sso did not provide an access token")]
    MissingAccessToken,
    #[error("sso did not provide access token expiration")]
    MissingAccessExpiration,
    #[error("sso did not provide a refresh token")]
    MissingRefreshToken,
    #[error("{0}")]
    Message(String),
}

impl EsiError {
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }

    pub fn authentication_failed(source: EsiError) -> Self {
        match source {
            already @ Self::AuthenticationFailed { .. } => already,
            other => Self::AuthenticationFailed {
                source: Box::new(other),
            },
        }
    }

    /// Status code of a non-2xx ESI answer, `None` for every other failure.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::RemoteCallFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_remote_failure(&self) -> bool {
        self.remote_status().is_some()
    }

    pub fn display_chain(&self) -> DisplayChainedError<'_> {
        DisplayChainedError { inner: self }
    }
}

pub struct DisplayChainedError<'a> {
    inner: &'a (dyn std::error::Error + 'static),
}

impl fmt::Debug for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self.inner);

        while let Some(err) = current {
            if first {
                first = false;
            } else {
                write!(f, " -> ")?;
            }

            write!(f, "{err}")?;
            current = err.source();
        }

        Ok(())
    }
}

impl fmt::Display for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
