use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// Payload of an access or refresh token.
///
/// Both token classes share this shape; only the `exp` distance from `iat`
/// differs. Registered claims are optional on the way in so that the
/// validator, not the codec, decides what a usable token is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TokenClaims {
    /// Subject (principal email)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Authorities as issued, in order. The claim key is fixed to `authorities`.
    #[serde(default, deserialize_with = "lenient_authorities")]
    pub authorities: Vec<String>,

    /// Issued at (Unix timestamp, seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp, seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Create claims for a subject with the given validity window.
    pub fn new(
        subject: impl ToString,
        authorities: Vec<String>,
        issued_at: i64,
        expires_at: i64,
    ) -> Self {
        Self {
            sub: Some(subject.to_string()),
            authorities,
            iat: Some(issued_at),
            exp: Some(expires_at),
        }
    }

    /// Subject if present and not blank.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token without `exp` counts as expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(true, |exp| exp <= current_timestamp)
    }
}

/// Accepts any JSON for the authorities claim; only string entries survive.
fn lenient_authorities<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let authorities = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(authorities)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = TokenClaims::new("a@x.com", vec!["USER".to_string()], 100, 200);
        assert_eq!(claims.subject(), Some("a@x.com"));
        assert_eq!(claims.authorities, vec!["USER".to_string()]);
        assert_eq!(claims.iat, Some(100));
        assert_eq!(claims.exp, Some(200));
    }

    #[test]
    fn test_serialized_keys() {
        let claims = TokenClaims::new("a@x.com", vec!["ROLE_USER".to_string()], 100, 200);
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            value,
            json!({
                "sub": "a@x.com",
                "authorities": ["ROLE_USER"],
                "iat": 100,
                "exp": 200
            })
        );
    }

    #[test]
    fn test_authorities_claim_absent() {
        let claims: TokenClaims = serde_json::from_value(json!({ "sub": "a@x.com" })).unwrap();
        assert!(claims.authorities.is_empty());
    }

    #[test]
    fn test_authorities_claim_not_a_list() {
        let claims: TokenClaims =
            serde_json::from_value(json!({ "sub": "a@x.com", "authorities": "ADMIN" })).unwrap();
        assert!(claims.authorities.is_empty());
    }

    #[test]
    fn test_authorities_claim_drops_non_string_entries() {
        let claims: TokenClaims = serde_json::from_value(json!({
            "sub": "a@x.com",
            "authorities": ["ADMIN", 42, null, {"name": "X"}, "ROLE_USER"]
        }))
        .unwrap();
        assert_eq!(
            claims.authorities,
            vec!["ADMIN".to_string(), "ROLE_USER".to_string()]
        );
    }

    #[test]
    fn test_blank_subject_is_absent() {
        let claims: TokenClaims = serde_json::from_value(json!({ "sub": "   " })).unwrap();
        assert_eq!(claims.subject(), None);
    }

    #[test]
    fn test_is_expired() {
        let claims = TokenClaims::new("a@x.com", vec![], 0, 1000);

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000));
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_is_expired_no_exp_claim() {
        let claims = TokenClaims {
            sub: Some("a@x.com".to_string()),
            ..TokenClaims::default()
        };
        assert!(claims.is_expired(0));
    }
}
