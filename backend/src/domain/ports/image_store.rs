//! Port for recipe picture storage.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Error, RecipeImage};

define_port_error! {
    /// Failures raised by image stores.
    pub enum ImageStoreError {
        /// Writing the file failed.
        Write { message: String } => "failed to store image: {message}",
        /// Removing the file failed.
        Remove { message: String } => "failed to remove image: {message}",
    }
}

impl From<ImageStoreError> for Error {
    fn from(value: ImageStoreError) -> Self {
        Error::internal(value.to_string())
    }
}

/// Storage for recipe pictures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist the picture and return its path relative to the media root.
    async fn save(&self, image: &RecipeImage) -> Result<String, ImageStoreError>;

    /// Remove a stored picture. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), ImageStoreError>;
}
