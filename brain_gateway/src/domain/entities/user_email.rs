use common::helper::error_chain_fmt;
use validator::validate_email;

/// Longest address accepted by SMTP (RFC 5321 path limit minus the angle brackets)
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Email of an account, normalized to its trimmed lowercase form
///
/// Accounts are looked up by email at login: normalizing here makes
/// `Ada@Example.com` and `ada@example.com` the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEmail(String);

impl UserEmail {
    pub fn parse(raw: &str) -> Result<UserEmail, UserEmailError> {
        let normalized = raw.trim().to_lowercase();

        if normalized.len() > EMAIL_MAX_LENGTH {
            return Err(UserEmailError::TooLong);
        }
        if !validate_email(&normalized) {
            return Err(UserEmailError::InvalidEmailFormat(normalized));
        }

        Ok(Self(normalized))
    }
}

impl AsRef<str> for UserEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(thiserror::Error)]
pub enum UserEmailError {
    #[error("`{0}` is not a valid email")]
    InvalidEmailFormat(String),
    #[error("Email must not exceed {} characters", EMAIL_MAX_LENGTH)]
    TooLong,
}

impl std::fmt::Debug for UserEmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
