// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Configuration utils.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use xdg::BaseDirectories;

/// Encountered when the configuration cannot be loaded.
#[derive(Error, Debug)]
#[error("Configuration Error: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Default configuration TOML string.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Name of the configuration file in the XDG config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Represents a piece of configuration that can be merged with another one.
trait MergeableConfig {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self;
}

/// Configuration for finding files.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FilesConfig {
    /// Extensions of files that are tagged when a directory is given.
    pub extensions: Option<Vec<String>>,
    /// Also visit subdirectories.
    pub recursive: Option<bool>,
}

impl MergeableConfig for FilesConfig {
    fn merge(&self, other: &Self) -> Self {
        FilesConfig {
            extensions: self
                .extensions
                .as_ref()
                .or(other.extensions.as_ref())
                .cloned(),
            recursive: self.recursive.or(other.recursive),
        }
    }
}

/// ID3 tag version that is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Id3Version {
    /// ID3v2.3
    #[serde(rename = "2.3")]
    Id3v23,
    /// ID3v2.4
    #[serde(rename = "2.4")]
    Id3v24,
}

/// Configuration for ID3 tags.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize)]
pub struct Id3Config {
    /// The ID3 version that is written to files.
    pub version: Option<Id3Version>,
}

impl MergeableConfig for Id3Config {
    fn merge(&self, other: &Self) -> Self {
        Id3Config {
            version: self.version.or(other.version),
        }
    }
}

/// The main configuration struct.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Configuration for finding files.
    #[serde(default)]
    pub files: FilesConfig,
    /// Configuration for ID3 tags.
    #[serde(default)]
    pub id3: Id3Config,
}

impl Default for Config {
    fn default() -> Self {
        Self::load_default().expect("Failed to load default config")
    }
}

impl MergeableConfig for Config {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self {
        Config {
            files: self.files.merge(&other.files),
            id3: self.id3.merge(&other.id3),
        }
    }
}

impl Config {
    /// Load the configuration from a string slice.
    fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load the default configuration.
    fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_str(DEFAULT_CONFIG)
    }

    /// Load the configuration from a file located at the given path.
    ///
    /// # Errors
    ///
    /// This method can fail if the file cannot be accessed or if it contains malformed
    /// configuration markup.
    pub fn load_from_path<T: AsRef<Path>>(path: T) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&text)?;
        Ok(config)
    }

    /// Find the user configuration file in the XDG config directories.
    #[must_use]
    pub fn find_user_config_path() -> Option<PathBuf> {
        BaseDirectories::with_prefix(env!("CARGO_PKG_NAME")).find_config_file(CONFIG_FILE_NAME)
    }

    /// Merge this configuration struct with the default values.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        let default = Self::default();
        self.merge(&default)
    }

    /// Extensions of files that are tagged when a directory is given (lowercase, without dot).
    #[must_use]
    pub fn extensions(&self) -> Vec<String> {
        self.files
            .extensions
            .iter()
            .flatten()
            .map(|extension| extension.trim_start_matches('.').to_ascii_lowercase())
            .collect()
    }

    /// Whether subdirectories are visited.
    #[must_use]
    pub fn recursive(&self) -> bool {
        self.files.recursive.unwrap_or(false)
    }

    /// The ID3 version that is written to files.
    #[cfg(feature = "id3")]
    #[must_use]
    pub fn id3_version(&self) -> id3::Version {
        match self.id3.version {
            Some(Id3Version::Id3v23) => id3::Version::Id3v23,
            Some(Id3Version::Id3v24) | None => id3::Version::Id3v24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.extensions(),
            ["aac", "aif", "aiff", "flac", "m4a", "mp3", "ogg", "opus", "wav", "wv"]
        );
        assert!(!config.recursive());
        assert_eq!(config.id3.version, Some(Id3Version::Id3v24));
    }

    #[test]
    fn test_merge_with_defaults() {
        let config = Config::load_from_str(
            r#"
            [files]
            recursive = true

            [id3]
            version = "2.3"
            "#,
        )
        .unwrap()
        .with_defaults();
        assert!(config.recursive());
        assert_eq!(
            config.extensions(),
            ["aac", "aif", "aiff", "flac", "m4a", "mp3", "ogg", "opus", "wav", "wv"]
        );
        assert_eq!(config.id3.version, Some(Id3Version::Id3v23));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::load_from_str("").unwrap().with_defaults();
        assert_eq!(config.extensions().len(), 10);
        assert_eq!(config.id3.version, Some(Id3Version::Id3v24));
    }

    #[test]
    fn test_extensions_are_normalized() {
        let config = Config::load_from_str(
            r#"
            [files]
            extensions = [".MP3", "Flac"]
            "#,
        )
        .unwrap();
        assert_eq!(config.extensions(), ["mp3", "flac"]);
    }

    #[test]
    fn test_invalid_id3_version() {
        let result = Config::load_from_str(
            r#"
            [id3]
            version = "2.2"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[files]\nrecursive = true\n").unwrap();
        let config = Config::load_from_path(file.path()).unwrap();
        assert!(config.recursive());
        assert!(config.files.extensions.is_none());
    }
}
