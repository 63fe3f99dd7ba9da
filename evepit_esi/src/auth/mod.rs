mod claims;
mod session;

pub use claims::{AccessTokenClaims, TokenVerifier, parse_character_id};
pub use session::{Clock, Principal, Session, SystemClock};
