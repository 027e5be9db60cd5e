//! Product photo storage on the local filesystem.
//!
//! Photos live flat inside one upload directory under random names, and are
//! served back by the router under `/uploads/<name>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Length of the random part of a stored file name.
const NAME_LENGTH: usize = 25;

/// Accepted file extensions (compared case-insensitively).
const ALLOWED_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Attempts at finding an unused name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Errors from storing or removing photos.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Only .jpg and .png photos are accepted")]
    UnsupportedType,

    #[error("The photo is empty")]
    Empty,

    #[error("invalid photo name: {0}")]
    InvalidName(String),

    #[error("photo storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl PhotoError {
    /// Whether the uploader can fix this by choosing another file.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::UnsupportedType | Self::Empty)
    }
}

/// Directory-backed photo store.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory photos are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns `PhotoError::Io` if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), PhotoError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Store an uploaded photo and return the name it was stored under.
    ///
    /// `original_name` is the client-supplied file name; only its extension
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns `PhotoError::UnsupportedType` for anything but `.jpg`/`.png`,
    /// `PhotoError::Empty` for an empty upload, or `PhotoError::Io`.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, PhotoError> {
        let extension = allowed_extension(original_name)?;
        if bytes.is_empty() {
            return Err(PhotoError::Empty);
        }

        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{}.{extension}", random_name());
            // create_new fails if the name is taken, so two uploads can never
            // share a file.
            let file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.dir.join(&name))
                .await;

            let mut file = match file {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            file.write_all(bytes).await?;
            file.flush().await?;

            tracing::debug!(photo = %name, size = bytes.len(), "photo stored");
            return Ok(name);
        }

        Err(PhotoError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            "no free photo name found",
        )))
    }

    /// Delete a stored photo. A photo that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns `PhotoError::InvalidName` if `name` is not a plain file name,
    /// or `PhotoError::Io` for other filesystem failures.
    pub async fn remove(&self, name: &str) -> Result<(), PhotoError> {
        if !is_plain_file_name(name) {
            return Err(PhotoError::InvalidName(name.to_owned()));
        }

        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(photo = %name, "photo already removed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a photo, logging instead of failing.
    pub async fn remove_or_warn(&self, name: &str) {
        if let Err(e) = self.remove(name).await {
            tracing::warn!(photo = %name, error = %e, "failed to remove photo");
        }
    }
}

/// The lower-cased extension of `file_name` if it is an accepted one.
fn allowed_extension(file_name: &str) -> Result<String, PhotoError> {
    let (_, extension) = file_name.rsplit_once('.').ok_or(PhotoError::UnsupportedType)?;
    let extension = extension.to_ascii_lowercase();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(PhotoError::UnsupportedType)
    }
}

fn random_name() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NAME_LENGTH)
        .map(char::from)
        .collect()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
