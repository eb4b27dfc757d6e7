use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        kind: TokenKind,
        issued_at: OffsetDateTime,
        ttl: Duration,
        iss: &str,
        aud: &str,
    ) -> Self {
        Self {
            sub: user_id,
            iat: issued_at.unix_timestamp().max(0) as usize,
            exp: (issued_at + ttl).unix_timestamp().max(0) as usize,
            iss: iss.to_owned(),
            aud: aud.to_owned(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let c = Claims::new(Uuid::nil(), TokenKind::Refresh, at, Duration::minutes(10), "i", "a");
        assert_eq!(c.iat, 1_700_000_000);
        assert_eq!(c.exp, 1_700_000_600);
        assert_eq!(serde_json::to_value(c.kind).unwrap(), "refresh");
    }
}
