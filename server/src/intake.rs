use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use kernel::StoredFile;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::domain::RawUpload;
use crate::media;
use crate::namer::{self, InvalidNameError};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("At least one photo is required.")]
    EmptyRequest,
    #[error("Too many photos: at most {max} allowed per request")]
    TooManyFiles { max: usize },
    #[error("Photo '{name}' exceeds the {max} bytes limit")]
    FileTooLarge { name: String, max: u64 },
    #[error("Photo '{name}' has unsupported type '{content_type}', only images are accepted")]
    UnsupportedType { name: String, content_type: String },
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
    #[error("Failed to store '{name}': {source}")]
    StorageWrite {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Per request upload limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_files: usize,
    pub max_file_size: u64,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_files: 3,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl IntakeLimits {
    pub fn check_count(&self, count: usize) -> Result<(), IntakeError> {
        if count == 0 {
            return Err(IntakeError::EmptyRequest);
        }
        if count > self.max_files {
            return Err(IntakeError::TooManyFiles {
                max: self.max_files,
            });
        }
        Ok(())
    }

    pub fn check_size(&self, name: &str, size: u64) -> Result<(), IntakeError> {
        if size > self.max_file_size {
            return Err(IntakeError::FileTooLarge {
                name: name.to_owned(),
                max: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// An upload that passed validation, with the name it will be stored under.
struct Planned {
    file: RawUpload,
    generated_name: String,
    content_type: &'static str,
}

/// Writes upload batches into a directory.
///
/// A batch is validated as a whole before the first byte hits the disk, so a
/// rejected batch never leaves files behind.
#[derive(Debug, Clone)]
pub struct UploadIntake {
    root: PathBuf,
    url_prefix: String,
    limits: IntakeLimits,
}

impl UploadIntake {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str, limits: IntakeLimits) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_owned(),
            limits,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn limits(&self) -> IntakeLimits {
        self.limits
    }

    pub async fn accept(&self, files: Vec<RawUpload>) -> Result<Vec<StoredFile>, IntakeError> {
        self.limits.check_count(files.len())?;

        let mut planned = Vec::with_capacity(files.len());
        for file in files {
            self.limits
                .check_size(&file.file_name, file.data.len() as u64)?;
            let content_type =
                media::accepted_image_type(file.content_type.as_deref(), &file.file_name)
                    .map_err(|content_type| IntakeError::UnsupportedType {
                        name: file.file_name.clone(),
                        content_type,
                    })?;
            let generated_name = namer::generate(&file.file_name)?;
            planned.push(Planned {
                file,
                generated_name,
                content_type,
            });
        }

        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| IntakeError::StorageWrite {
                name: self.root.display().to_string(),
                source,
            })?;

        self.store(planned).await
    }

    /// Writes an already validated batch, removing what was written if any file fails.
    async fn store(&self, planned: Vec<Planned>) -> Result<Vec<StoredFile>, IntakeError> {
        let mut stored: Vec<StoredFile> = Vec::with_capacity(planned.len());
        for Planned {
            file,
            generated_name,
            content_type,
        } in planned
        {
            let path = self.root.join(&generated_name);
            if let Err(source) = write_new(&path, &file.data).await {
                tracing::error!("file '{}' not stored. Error: {}", file.file_name, source);
                self.rollback(&stored).await;
                return Err(IntakeError::StorageWrite {
                    name: file.file_name,
                    source,
                });
            }
            tracing::info!(
                "file: {} stored as: {} size: {}",
                file.file_name,
                generated_name,
                file.data.len()
            );
            stored.push(StoredFile {
                url: format!("{}/{generated_name}", self.url_prefix),
                path: path.display().to_string(),
                generated_name,
                original_name: file.file_name,
                size: file.data.len() as u64,
                content_type: content_type.to_owned(),
                created_at: Utc::now(),
            });
        }
        Ok(stored)
    }

    async fn rollback(&self, stored: &[StoredFile]) {
        for file in stored {
            if let Err(e) = fs::remove_file(self.root.join(&file.generated_name)).await {
                tracing::error!("orphaned file '{}' not removed. Error: {}", file.path, e);
            }
        }
    }
}

/// Creates `path` exclusively and writes `data` durably.
///
/// Fails with `AlreadyExists` instead of overwriting. A file this call created
/// is removed again when writing it fails.
async fn write_new(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    let written = async {
        file.write_all(data).await?;
        file.sync_all().await
    }
    .await;
    if let Err(e) = written {
        drop(file);
        fs::remove_file(path).await.unwrap_or_default();
        return Err(e);
    }
    Ok(())
}
