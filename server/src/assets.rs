use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;

use crate::domain::Asset;
use crate::media;
use crate::namer::InvalidNameError;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
    #[error("File '{0}' not found")]
    NotFound(String),
    #[error("Failed to read '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Read-only view of the upload directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads a stored file by its path relative to the storage root.
    ///
    /// Never resolves outside the root: lexical traversal is rejected up front and
    /// the canonical path is checked afterwards, which also covers symlinks.
    pub async fn get(&self, path: &str) -> Result<Asset, AssetError> {
        check_relative(path)?;

        let not_found = || AssetError::NotFound(path.to_owned());
        // Missing root means nothing has been uploaded yet
        let Ok(root) = fs::canonicalize(&self.root).await else {
            return Err(not_found());
        };
        let Ok(resolved) = fs::canonicalize(root.join(path)).await else {
            return Err(not_found());
        };
        if !resolved.starts_with(&root) {
            tracing::warn!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                resolved.display()
            );
            return Err(InvalidNameError::new(path, "path resolves outside storage root").into());
        }
        if !fs::metadata(&resolved).await.is_ok_and(|m| m.is_file()) {
            return Err(not_found());
        }

        let data = fs::read(&resolved).await.map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => not_found(),
            _ => AssetError::Read {
                name: path.to_owned(),
                source,
            },
        })?;
        Ok(Asset {
            name: file_name(&resolved),
            content_type: media::content_type_for(&resolved),
            data,
        })
    }
}

fn check_relative(path: &str) -> Result<(), InvalidNameError> {
    if path.is_empty() {
        return Err(InvalidNameError::new(path, "path is empty"));
    }
    if path.contains('\0') {
        return Err(InvalidNameError::new(path, "path contains a null byte"));
    }
    if path.contains("..") {
        return Err(InvalidNameError::new(path, "path contains '..'"));
    }
    if path.contains('\\') || Path::new(path).is_absolute() || path.starts_with('/') {
        return Err(InvalidNameError::new(path, "path must be relative"));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &[u8])]) -> (TempDir, AssetStore) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("uploads");
        std::fs::create_dir_all(&root).unwrap();
        for (name, content) in files {
            std::fs::write(root.join(name), content).unwrap();
        }
        (dir, AssetStore::new(root))
    }

    #[tokio::test]
    async fn get_existing_file() {
        // Arrange
        let (_dir, store) = store_with(&[("1-abc-apple.jpg", b"jpeg bytes")]);

        // Act
        let asset = store.get("1-abc-apple.jpg").await.unwrap();

        // Assert
        assert_eq!(asset.data, b"jpeg bytes");
        assert_eq!(asset.content_type, "image/jpeg");
        assert_eq!(asset.name, "1-abc-apple.jpg");
    }

    #[tokio::test]
    async fn get_missing_file() {
        // Arrange
        let (_dir, store) = store_with(&[]);

        // Act
        let result = store.get("nope.jpg").await;

        // Assert
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_when_root_absent() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let store = AssetStore::new(dir.path().join("never-created"));

        // Act
        let result = store.get("a.jpg").await;

        // Assert
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_directory_is_not_found() {
        // Arrange
        let (dir, store) = store_with(&[]);
        std::fs::create_dir(dir.path().join("uploads").join("sub")).unwrap();

        // Act
        let result = store.get("sub").await;

        // Assert
        assert!(matches!(result, Err(AssetError::NotFound(_))));
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case("../secret.txt")]
    #[case("sub/../../secret.txt")]
    #[case("/etc/passwd")]
    #[case("..\\secret.txt")]
    #[case("a\0b")]
    #[trace]
    #[tokio::test]
    async fn get_rejects_traversal(#[case] path: &str) {
        // Arrange
        let (dir, store) = store_with(&[]);
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        // Act
        let result = store.get(path).await;

        // Assert
        assert!(matches!(result, Err(AssetError::InvalidName(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn get_rejects_symlink_out_of_root() {
        // Arrange
        let (dir, store) = store_with(&[]);
        let secret = dir.path().join("secret.txt");
        std::fs::write(&secret, b"secret").unwrap();
        std::os::unix::fs::symlink(&secret, dir.path().join("uploads").join("link.txt")).unwrap();

        // Act
        let result = store.get("link.txt").await;

        // Assert
        assert!(matches!(result, Err(AssetError::InvalidName(_))));
    }
}
