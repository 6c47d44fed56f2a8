use argon2::{
    password_hash::{self, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use common::helper::error_chain_fmt;
use secrecy::{ExposeSecret, Secret};

pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Argon2id cost: memory in KiB, iterations, lanes
const ARGON2_M_COST: u32 = 15_000;
const ARGON2_T_COST: u32 = 2;
const ARGON2_P_COST: u32 = 1;

/// Hash of a user password, serialized in the PHC string format
///
/// The PHC string carries the algorithm, its parameters and the salt next to the hash.
/// Verifying reads them back from the string, so hashes computed with older parameters
/// stay valid.
#[derive(Debug, Clone)]
pub struct UserPassword(Secret<String>);

impl UserPassword {
    /// Hashes a clear password that satisfies the length policy
    ///
    /// Blocks the current thread for a while: call it from a blocking task.
    #[tracing::instrument(name = "Hashing password", skip(password))]
    pub fn compute_password_hash(
        password: Secret<String>,
    ) -> Result<UserPassword, UserPasswordError> {
        check_length(password.expose_secret())?;

        let salt = SaltString::generate(&mut rand::thread_rng());
        let hasher = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)?,
        );
        let phc_string = hasher
            .hash_password(password.expose_secret().as_bytes(), &salt)?
            .to_string();

        Ok(UserPassword(Secret::new(phc_string)))
    }

    /// Wraps a stored PHC string, rejecting it if it is malformed
    #[tracing::instrument(name = "Parsing password hash", skip(phc_string))]
    pub fn parse(phc_string: Secret<String>) -> Result<UserPassword, UserPasswordError> {
        PasswordHash::new(phc_string.expose_secret())?;
        Ok(UserPassword(phc_string))
    }

    /// Checks a password candidate against this hash
    ///
    /// Blocks the current thread for a while: call it from a blocking task.
    #[tracing::instrument(name = "Verifying password", skip(self, password_candidate))]
    pub fn verify(&self, password_candidate: Secret<String>) -> Result<(), UserPasswordError> {
        let expected = PasswordHash::new(self.0.expose_secret())?;

        let candidate = password_candidate.expose_secret().as_bytes();

        match Argon2::default().verify_password(candidate, &expected) {
            Ok(()) => Ok(()),
            Err(password_hash::Error::Password) => Err(UserPasswordError::InvalidCredentials(
                "password does not match".into(),
            )),
            Err(error) => Err(UserPasswordError::HashError(error)),
        }
    }
}

fn check_length(password: &str) -> Result<(), UserPasswordError> {
    let length = password.chars().count();

    if (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(UserPasswordError::InvalidLength)
    }
}

impl AsRef<str> for UserPassword {
    fn as_ref(&self) -> &str {
        self.0.expose_secret()
    }
}

#[derive(thiserror::Error)]
pub enum UserPasswordError {
    #[error(
        "Password must contain between {} and {} characters",
        PASSWORD_MIN_LENGTH,
        PASSWORD_MAX_LENGTH
    )]
    InvalidLength,
    #[error(transparent)]
    HashError(#[from] password_hash::Error),
    #[error("Invalid hashing parameters: {0}")]
    ParamsError(#[from] argon2::Error),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

impl std::fmt::Debug for UserPasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
