//! Conversions from entity validation errors into client-facing [`Error`]s.
//!
//! Every conversion attaches `details: {"field", "code"}` so clients can
//! highlight the offending input.

use serde_json::json;

use super::{
    CatalogueValidationError, CredentialsValidationError, Error, FilterValueError,
    RecipeValidationError, UnknownExportFormat, UserValidationError,
};

/// Build a 400 error pointing at one request field.
pub(crate) fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        field_error(value.field(), value.code(), value.to_string())
    }
}

impl CredentialsValidationError {
    /// Convert, reporting password failures against `password_field`.
    pub(crate) fn into_error(self, password_field: &str) -> Error {
        match self {
            Self::Email(inner) => inner.into(),
            other => field_error(password_field, other.code(), other.to_string()),
        }
    }
}

impl From<CredentialsValidationError> for Error {
    fn from(value: CredentialsValidationError) -> Self {
        value.into_error("password")
    }
}

impl From<CatalogueValidationError> for Error {
    fn from(value: CatalogueValidationError) -> Self {
        field_error(value.field(), "invalid", value.to_string())
    }
}

impl From<RecipeValidationError> for Error {
    fn from(value: RecipeValidationError) -> Self {
        let mut details = json!({
            "field": value.field(),
            "code": value.code(),
        });
        match &value {
            RecipeValidationError::AmountOutOfRange { ingredient, .. }
            | RecipeValidationError::DuplicateIngredient { ingredient }
            | RecipeValidationError::UnknownIngredient { ingredient } => {
                details["id"] = json!(ingredient.get());
            }
            RecipeValidationError::DuplicateTag { tag } | RecipeValidationError::UnknownTag { tag } => {
                details["id"] = json!(tag.get());
            }
            _ => {}
        }
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

impl From<FilterValueError> for Error {
    fn from(value: FilterValueError) -> Self {
        field_error(value.parameter, "invalid", value.to_string())
    }
}

impl From<UnknownExportFormat> for Error {
    fn from(value: UnknownExportFormat) -> Self {
        field_error("format", "invalid_choice", value.to_string())
    }
}
