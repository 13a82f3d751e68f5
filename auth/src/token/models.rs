use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Identity a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identity (email)
    pub subject: String,
    /// Granted authorities, bare or already `ROLE_` prefixed
    pub authorities: Vec<String>,
}

impl Principal {
    pub fn new<I, S>(subject: impl ToString, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.to_string(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }
}

/// Token class, selecting the time-to-live applied at issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
    Access,
    Refresh,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenClass::Access => f.write_str("access"),
            TokenClass::Refresh => f.write_str("refresh"),
        }
    }
}

/// Access and refresh token minted together for one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
