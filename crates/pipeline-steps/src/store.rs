//! Object storage used by the steps.
//!
//! Steps only need two operations: list the keys under a prefix and stream
//! one object's body. The store is passed in by the caller.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no objects found under prefix {prefix}")]
    EmptyPrefix { prefix: String },

    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("I/O error on {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(key: impl Into<String>, source: io::Error) -> Self {
        let key = key.into();
        if source.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound { key }
        } else {
            StoreError::Io { key, source }
        }
    }

    /// Returns whether the same call might succeed if repeated.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            StoreError::EmptyPrefix { .. } | StoreError::NotFound { .. } => false,
        }
    }
}

pub type Body = Box<dyn Read + Send>;

pub trait ObjectStore {
    /// Keys starting with `prefix`, in lexicographic order.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Stream the body of `key`.
    fn get_object(&self, key: &str) -> Result<Body, StoreError>;

    /// The first key under `prefix`.
    fn first_key(&self, prefix: &str) -> Result<String, StoreError> {
        self.list_keys(prefix)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::EmptyPrefix {
                prefix: prefix.to_string(),
            })
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for &S {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_keys(prefix)
    }

    fn get_object(&self, key: &str) -> Result<Body, StoreError> {
        (**self).get_object(key)
    }
}

impl<S: ObjectStore + ?Sized> ObjectStore for Box<S> {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list_keys(prefix)
    }

    fn get_object(&self, key: &str) -> Result<Body, StoreError> {
        (**self).get_object(key)
    }
}

/// A directory standing in for a bucket: key `a/b.csv` is the file
/// `<root>/a/b.csv`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StoreError::NotFound {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }

    fn collect_keys(&self, dir: &Path, keys: &mut Vec<String>) -> Result<(), StoreError> {
        let dir_error = |err| StoreError::io(dir.display().to_string(), err);
        for entry in fs::read_dir(dir).map_err(dir_error)? {
            let entry = entry.map_err(dir_error)?;
            let path = entry.path();
            if path.is_dir() {
                self.collect_keys(&path, keys)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                keys.push(key);
            }
        }
        Ok(())
    }
}

impl ObjectStore for LocalObjectStore {
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        if self.root.is_dir() {
            self.collect_keys(&self.root, &mut keys)?;
        }
        keys.retain(|key| key.starts_with(prefix));
        keys.sort();
        tracing::debug!(prefix, keys = keys.len(), "listed objects");
        Ok(keys)
    }

    fn get_object(&self, key: &str) -> Result<Body, StoreError> {
        let path = self.path_for(key)?;
        let file = File::open(&path).map_err(|err| StoreError::io(key, err))?;
        Ok(Box::new(file))
    }
}
