//! Credentials, password hashing and API tokens.
//!
//! Raw passwords and raw tokens never leave this module except through
//! [`zeroize::Zeroizing`] buffers; storage only sees Argon2 PHC strings and
//! SHA-256 token digests.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::{Email, UserValidationError};

/// Shortest accepted password.
pub const PASSWORD_MIN: usize = 8;
/// Longest accepted password.
pub const PASSWORD_MAX: usize = 128;
const TOKEN_BYTES: usize = 20;

/// Validation failures for login and password payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// The e-mail address was missing or malformed.
    Email(UserValidationError),
    /// The password was blank.
    EmptyPassword,
    /// The password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// The password is longer than [`PASSWORD_MAX`].
    PasswordTooLong { max: usize },
    /// The password consists of digits only.
    PasswordNumeric,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(inner) => inner.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
            Self::PasswordNumeric => write!(f, "password must not be entirely numeric"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl CredentialsValidationError {
    /// Machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Email(inner) => inner.code(),
            Self::EmptyPassword => "blank",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordTooLong { .. } => "max_length",
            Self::PasswordNumeric => "password_entirely_numeric",
        }
    }
}

/// Validated login payload.
///
/// The password is not checked against the strength rules; an old account
/// with a weak password can still sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw request values.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = Email::new(email).map_err(CredentialsValidationError::Email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validated login e-mail.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Raw password to verify.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A new password that passes the strength rules.
///
/// # Examples
/// ```
/// use backend::domain::NewPassword;
///
/// assert!(NewPassword::new("correct horse").is_ok());
/// assert!(NewPassword::new("12345678").is_err());
/// assert!(NewPassword::new("short").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a candidate password.
    pub fn new(raw: &str) -> Result<Self, CredentialsValidationError> {
        if raw.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(CredentialsValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            return Err(CredentialsValidationError::PasswordNumeric);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// The password as supplied.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(**redacted**)")
    }
}

/// Failure to produce or parse a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Argon2id hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a validated password with a fresh random salt.
    pub fn create(password: &NewPassword) -> Result<Self, PasswordHashError> {
        let mut salt_bytes = [0_u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|err| PasswordHashError {
            message: err.to_string(),
        })?;
        Argon2::default()
            .hash_password(password.as_str().as_bytes(), &salt)
            .map(|hash| Self(hash.to_string()))
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })
    }

    /// Wrap a hash loaded from storage.
    pub fn from_stored(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Check a candidate password. Unparseable stored hashes never match.
    pub fn verify(&self, candidate: &str) -> bool {
        match PhcString::new(&self.0) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// PHC-encoded hash string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(**redacted**)")
    }
}

/// SHA-256 digest of an API token, hex encoded. This is what gets stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Digest a raw token presented by a client.
    pub fn of(raw: &str) -> Self {
        Self(hex::encode(Sha256::digest(raw.as_bytes())))
    }

    /// Wrap a digest loaded from storage.
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }

    /// Lower-case hex digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Freshly issued API token. Only its digest is persisted.
///
/// # Examples
/// ```
/// use backend::domain::AuthToken;
///
/// let token = AuthToken::generate();
/// assert_eq!(token.expose().len(), 40);
/// assert_eq!(token.digest(), backend::domain::TokenDigest::of(token.expose()));
/// ```
#[derive(Clone)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Generate a random 40-character hex token.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Zeroizing::new(hex::encode(bytes)))
    }

    /// Raw token to hand back to the client once.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// SHA-256 digest stored in place of the raw key.
    pub fn digest(&self) -> TokenDigest {
        TokenDigest::of(self.expose())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(**redacted**)")
    }
}
