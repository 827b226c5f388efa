//! Token types and expiry evaluation.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Look-ahead applied to every expiry check, in seconds.
///
/// A token with this much time left (or less) counts as expired.
pub const EXPIRY_BUFFER_SECS: i64 = 5 * 60;

/// The default expiry look-ahead as a [`Duration`].
pub fn default_expiry_buffer() -> Duration {
    Duration::seconds(EXPIRY_BUFFER_SECS)
}

/// Returns true if `expiry` is within `buffer` of `now` (or already past).
///
/// Exactly `buffer` remaining counts as expired.
pub fn is_expired_at(expiry: DateTime<Utc>, now: DateTime<Utc>, buffer: Duration) -> bool {
    expiry - now <= buffer
}

/// Returns true if `expiry` is within the default buffer of the current time.
pub fn is_expired(expiry: DateTime<Utc>) -> bool {
    is_expired_at(expiry, Utc::now(), default_expiry_buffer())
}

/// Parse an expiry timestamp.
///
/// Accepts RFC 3339 and naive ISO-8601 date-times; naive values are read as UTC.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Format an expiry timestamp for storage. Lossless with [`parse_expiry`].
pub fn format_expiry(expiry: DateTime<Utc>) -> String {
    expiry.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// An access token for authenticated API requests.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh and logout requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// An access/refresh token pair with their absolute expiry times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: AccessToken,
    pub access_expiry: DateTime<Utc>,
    pub refresh_token: RefreshToken,
    pub refresh_expiry: DateTime<Utc>,
}

impl CredentialPair {
    /// Returns true if the access token is within `buffer` of expiry at `now`.
    pub fn access_expired_at(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        is_expired_at(self.access_expiry, now, buffer)
    }

    /// Returns true if the refresh token is within `buffer` of expiry at `now`.
    pub fn refresh_expired_at(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        is_expired_at(self.refresh_expiry, now, buffer)
    }

    /// Summarize the expiry state of this pair.
    pub fn status_at(&self, now: DateTime<Utc>, buffer: Duration) -> TokenStatus {
        TokenStatus {
            access_expired: self.access_expired_at(now, buffer),
            refresh_expired: self.refresh_expired_at(now, buffer),
            access_expiry: self.access_expiry,
            refresh_expiry: self.refresh_expiry,
        }
    }
}

/// Expiry summary of the stored credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    pub access_expired: bool,
    pub refresh_expired: bool,
    pub access_expiry: DateTime<Utc>,
    pub refresh_expiry: DateTime<Utc>,
}

/// A single token as sent by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub token: String,
    pub expires: String,
}

/// The `tokens` object returned by login, registration and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: TokenGrant,
    pub refresh: TokenGrant,
}

impl AuthTokens {
    /// Convert the wire representation into a [`CredentialPair`].
    ///
    /// Fails with a description if either expiry cannot be parsed.
    pub fn into_pair(self) -> Result<CredentialPair, String> {
        let access_expiry = parse_expiry(&self.access.expires)
            .ok_or_else(|| format!("invalid access expiry '{}'", self.access.expires))?;
        let refresh_expiry = parse_expiry(&self.refresh.expires)
            .ok_or_else(|| format!("invalid refresh expiry '{}'", self.refresh.expires))?;

        Ok(CredentialPair {
            access_token: AccessToken::new(self.access.token),
            access_expiry,
            refresh_token: RefreshToken::new(self.refresh.token),
            refresh_expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn more_than_buffer_remaining_is_valid() {
        let expiry = now() + Duration::minutes(5) + Duration::seconds(1);
        assert!(!is_expired_at(expiry, now(), default_expiry_buffer()));
    }

    #[test]
    fn exactly_buffer_remaining_is_expired() {
        let expiry = now() + Duration::minutes(5);
        assert!(is_expired_at(expiry, now(), default_expiry_buffer()));
    }

    #[test]
    fn inside_buffer_and_past_are_expired() {
        let buffer = default_expiry_buffer();
        assert!(is_expired_at(now() + Duration::minutes(3), now(), buffer));
        assert!(is_expired_at(now() - Duration::hours(1), now(), buffer));
    }

    #[test]
    fn parses_rfc3339_and_naive_expiries() {
        let rfc = parse_expiry("2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap());

        let naive = parse_expiry("2025-03-01T12:00:00.123456").unwrap();
        assert_eq!(naive.timestamp(), now().timestamp());

        assert!(parse_expiry("tomorrow").is_none());
    }

    #[test]
    fn formatted_expiry_round_trips() {
        let expiry = now() + Duration::nanoseconds(123_456_789);
        assert_eq!(parse_expiry(&format_expiry(expiry)), Some(expiry));
    }

    #[test]
    fn auth_tokens_convert_to_pair() {
        let tokens = AuthTokens {
            access: TokenGrant {
                token: "a".into(),
                expires: "2025-03-01T12:30:00".into(),
            },
            refresh: TokenGrant {
                token: "r".into(),
                expires: "2025-03-11T12:00:00Z".into(),
            },
        };
        let pair = tokens.into_pair().unwrap();
        assert_eq!(pair.access_token.as_str(), "a");
        assert_eq!(pair.refresh_token.as_str(), "r");
        let status = pair.status_at(now(), default_expiry_buffer());
        assert!(!status.access_expired);
        assert!(!status.refresh_expired);
    }

    #[test]
    fn auth_tokens_reject_bad_expiry() {
        let tokens = AuthTokens {
            access: TokenGrant {
                token: "a".into(),
                expires: "soon".into(),
            },
            refresh: TokenGrant {
                token: "r".into(),
                expires: "2025-03-11T12:00:00Z".into(),
            },
        };
        assert!(tokens.into_pair().is_err());
    }

    #[test]
    fn tokens_hide_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));

        let token = RefreshToken::new("refresh_token_value_here");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("refresh_token_value"));
    }
}
