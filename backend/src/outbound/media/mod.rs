//! Filesystem-backed recipe image storage.
//!
//! Images live under `<media_root>/recipes/images/` with random file names.
//! All access goes through a `cap_std` directory handle opened on the media
//! root, so stored paths can never escape it.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::RecipeImage;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// Directory, relative to the media root, holding recipe pictures.
pub const RECIPE_IMAGE_DIR: &str = "recipes/images";

/// Image store writing into a media root on the local filesystem.
#[derive(Clone)]
pub struct FilesystemImageStore {
    root: Arc<Dir>,
}

impl FilesystemImageStore {
    /// Open (creating if needed) the media root and its image directory.
    pub fn open(media_root: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(media_root, ambient_authority())?;
        let root = Dir::open_ambient_dir(media_root, ambient_authority())?;
        root.create_dir_all(RECIPE_IMAGE_DIR)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, image: &RecipeImage) -> Result<String, ImageStoreError> {
        let path = format!(
            "{RECIPE_IMAGE_DIR}/{}.{}",
            Uuid::new_v4().simple(),
            image.extension()
        );
        let root = Arc::clone(&self.root);
        let bytes = image.bytes().to_vec();
        let target = path.clone();
        tokio::task::spawn_blocking(move || root.write(&target, bytes))
            .await
            .map_err(|err| ImageStoreError::write(err.to_string()))?
            .map_err(|err| ImageStoreError::write(err.to_string()))?;
        debug!(%path, "stored recipe image");
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), ImageStoreError> {
        let root = Arc::clone(&self.root);
        let target = path.to_owned();
        let result = tokio::task::spawn_blocking(move || root.remove_file(&target))
            .await
            .map_err(|err| ImageStoreError::remove(err.to_string()))?;
        match result {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ImageStoreError::remove(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Round trips through a temporary media root.
    use super::*;
    use crate::domain::test_fixtures::GIF_DATA_URI;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn media_root() -> TempDir {
        tempfile::tempdir().expect("temporary media root")
    }

    fn image() -> RecipeImage {
        RecipeImage::from_data_uri(GIF_DATA_URI).expect("valid gif")
    }

    #[rstest]
    #[tokio::test]
    async fn save_writes_under_image_directory(media_root: TempDir) {
        let store = FilesystemImageStore::open(media_root.path()).expect("open store");

        let path = store.save(&image()).await.expect("save image");

        assert!(path.starts_with("recipes/images/"));
        assert!(path.ends_with(".gif"));
        let stored = Dir::open_ambient_dir(media_root.path(), ambient_authority())
            .expect("open root")
            .read(&path)
            .expect("read stored image");
        assert_eq!(stored, image().bytes());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_removes_file_and_ignores_missing(media_root: TempDir) {
        let store = FilesystemImageStore::open(media_root.path()).expect("open store");
        let path = store.save(&image()).await.expect("save image");

        store.delete(&path).await.expect("first delete");
        store.delete(&path).await.expect("missing file is fine");

        let root = Dir::open_ambient_dir(media_root.path(), ambient_authority()).expect("root");
        assert!(!root.exists(&path));
    }

    #[rstest]
    #[tokio::test]
    async fn delete_refuses_paths_outside_root(media_root: TempDir) {
        let store = FilesystemImageStore::open(media_root.path()).expect("open store");

        let result = store.delete("../outside.png").await;

        assert!(matches!(result, Err(ImageStoreError::Remove { .. })));
    }
}
