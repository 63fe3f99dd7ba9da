pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod eve_client;

pub use auth::{AccessTokenClaims, Clock, Principal, Session, SystemClock, TokenVerifier};
pub use client::{EsiApiClient, EsiResponse, RefreshedTokens, SsoClient};
pub use config::{EsiConfig, RetryPolicy};
pub use errors::{EsiError, EsiResult};
pub use eve_client::EveClient;
