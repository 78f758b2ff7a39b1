//! API key loading.
//!
//! The key lives in a plain text file whose first line is the key.  Any
//! problem reading it is startup-fatal: the caller aborts before serving a
//! single request.

use std::fmt;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while reading the credential file.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read credential file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("credential file {} does not contain a key on its first line", .0.display())]
    Empty(PathBuf),
}

/// An API key.  `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<{} chars>)", self.0.chars().count())
    }
}

/// Read the first line of `path` and return it, trimmed, as an [`ApiKey`].
pub fn load_api_key(path: &Path) -> Result<ApiKey, CredentialError> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CredentialError::NotFound(path.to_path_buf()),
        _ => CredentialError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let key = first_line.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty(path.to_path_buf()));
    }

    Ok(ApiKey::new(key))
}
