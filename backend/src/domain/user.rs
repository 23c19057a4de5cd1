//! Account identity types.
//!
//! E-mail is the login identifier; the username is a public handle that need
//! not be unique.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest accepted e-mail address.
pub const EMAIL_MAX: usize = 254;
/// Longest accepted username, first name or last name.
pub const NAME_MAX: usize = 150;

/// Validation failures for account fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The e-mail address was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The e-mail address is not `local@domain`.
    #[error("enter a valid email address")]
    InvalidEmail,
    /// The e-mail address is longer than [`EMAIL_MAX`].
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// The username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The username contains characters outside letters, digits and `.@+-_`.
    #[error("username may contain only letters, digits and @/./+/-/_ characters")]
    InvalidUsername,
    /// A name field was blank.
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
    /// A name field exceeded [`NAME_MAX`].
    #[error("{field} must be at most {max} characters")]
    NameTooLong { field: &'static str, max: usize },
}

impl UserValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::EmptyUsername | Self::InvalidUsername => "username",
            Self::EmptyName { field } | Self::NameTooLong { field, .. } => field,
        }
    }

    /// Machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyEmail | Self::EmptyUsername | Self::EmptyName { .. } => "blank",
            Self::InvalidEmail | Self::InvalidUsername => "invalid",
            Self::EmailTooLong { .. } | Self::NameTooLong { .. } => "max_length",
        }
    }
}

/// Database identifier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Normalised e-mail address.
///
/// The domain part is lower-cased; the local part is kept as entered.
///
/// # Examples
/// ```
/// use backend::domain::Email;
///
/// let email = Email::new("  Cook@Example.COM ").expect("valid");
/// assert_eq!(email.as_ref(), "Cook@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and normalise an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = trimmed.rsplit_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = !domain.is_empty()
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && domain.contains('.');
        if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new(r"^[\w.@+-]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

/// Public handle shown next to recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate a username.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if raw.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field: "username",
                max: NAME_MAX,
            });
        }
        if !username_regex().is_match(&raw) {
            return Err(UserValidationError::InvalidUsername);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// First or last name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name; `field` names the request field for error reporting.
    pub fn new(field: &'static str, raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName { field });
        }
        if trimmed.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                field,
                max: NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Profile fields supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserProfile {
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

impl NewUserProfile {
    /// Validate raw registration fields.
    pub fn try_from_parts(
        email: &str,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            username: Username::new(username)?,
            first_name: PersonName::new("first_name", first_name)?,
            last_name: PersonName::new("last_name", last_name)?,
        })
    }
}

/// Stored account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Username,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

/// A user as seen by a particular requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    /// Whether the requester follows this user; always false for anonymous
    /// requesters and for the requester's own profile.
    pub is_subscribed: bool,
}
