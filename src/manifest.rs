// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Manifest files provide tag values and options as plain text.
//!
//! Each line contains a `key=value` pair, where the key is either a tag name (e.g. `album`) or
//! one of the options `file`, `files-directory`, `parse-title-capitalize`, `parse-title-as-is`,
//! `parse-title-clean` and `parse-track-number`. The value is the rest of the line after the
//! first `=`, with surrounding whitespace removed:
//!
//! ```text
//! files-directory=/music/Mogwai/Young Team
//! album=Young Team
//! artist=Mogwai
//! year=1997
//! parse-title-clean=(?<=\d\d\s).+(?=\.flac)
//! ```

use crate::edit::TitleParser;
use crate::tag::{TagKey, TagValue};
use crate::Error;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Keys that are accepted in addition to tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKey {
    /// Path of a single audio file.
    File,
    /// Path of a directory containing audio files.
    FilesDirectory,
    /// Pattern for a title parser.
    ParseTitle(TitleParser),
    /// Pattern for the track number parser.
    ParseTrackNumber,
}

impl OptionKey {
    /// Find the option for a manifest key.
    fn from_key(key: &str) -> Option<Self> {
        let option = match key {
            "file" => Self::File,
            "files-directory" => Self::FilesDirectory,
            "parse-title-capitalize" => Self::ParseTitle(TitleParser::Capitalize),
            "parse-title-as-is" => Self::ParseTitle(TitleParser::AsIs),
            "parse-title-clean" => Self::ParseTitle(TitleParser::Clean),
            "parse-track-number" => Self::ParseTrackNumber,
            _ => return None,
        };
        Some(option)
    }
}

/// The parsed content of a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Path of a single audio file.
    pub file: Option<PathBuf>,
    /// Path of a directory containing audio files.
    pub files_directory: Option<PathBuf>,
    /// Tag values.
    pub tags: BTreeMap<TagKey, TagValue>,
    /// Patterns for the title parsers.
    pub title_patterns: BTreeMap<TitleParser, String>,
    /// Pattern for the track number parser.
    pub track_number_pattern: Option<String>,
}

impl Manifest {
    /// Read a manifest from the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a regular file or cannot be read,
    /// [`Error::NotATextFile`] if the content is not UTF-8 text, or an error if the content is
    /// malformed (see [`Manifest::parse`]).
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        log::debug!("Reading manifest {}", path.display());
        let bytes = fs::read(path)?;
        if bytes.contains(&0) {
            return Err(Error::NotATextFile(path.to_path_buf()));
        }
        let text =
            String::from_utf8(bytes).map_err(|_| Error::NotATextFile(path.to_path_buf()))?;
        Self::parse(&text)
    }

    /// Parse a manifest from a string.
    ///
    /// Empty lines and lines starting with `#` are skipped. Lines without `=` and unknown keys
    /// are skipped with a warning. If a key occurs more than once, the last value wins. An empty
    /// parser pattern is kept, so that it can disable a pattern given on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value of a numeric tag is not a number.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let mut manifest = Self::default();

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Skipping manifest line {line_number} without '=': {line:?}");
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            if let Ok(tag_key) = key.parse::<TagKey>() {
                manifest.tags.insert(tag_key, tag_key.parse_value(value)?);
                continue;
            }

            match OptionKey::from_key(key) {
                Some(OptionKey::File | OptionKey::FilesDirectory) if value.is_empty() => {
                    log::debug!("Ignoring empty path for {key:?} on line {line_number}");
                }
                Some(OptionKey::File) => manifest.file = Some(PathBuf::from(value)),
                Some(OptionKey::FilesDirectory) => {
                    manifest.files_directory = Some(PathBuf::from(value));
                }
                Some(OptionKey::ParseTitle(parser)) => {
                    manifest.title_patterns.insert(parser, value.to_string());
                }
                Some(OptionKey::ParseTrackNumber) => {
                    manifest.track_number_pattern = Some(value.to_string());
                }
                None => log::warn!("Skipping unknown manifest key {key:?} on line {line_number}"),
            }
        }

        Ok(manifest)
    }
}
