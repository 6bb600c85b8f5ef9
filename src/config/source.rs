// Copyright 2026 The Trickle Project
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Where raw config YAML comes from.
///
/// The loader only ever sees a string of YAML; whether it came off disk
/// or was assembled in a test is this trait's concern.
pub trait ConfigSource {
    fn load(&self) -> Result<String, ConfigError>;
}

/// YAML read from a file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<String, ConfigError> {
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

/// YAML held in memory. Tests use this to avoid file I/O.
pub struct StringSource {
    pub content: String,
}

impl StringSource {
    pub fn of(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl ConfigSource for StringSource {
    fn load(&self) -> Result<String, ConfigError> {
        Ok(self.content.clone())
    }
}
