// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Error and result types.

use crate::tag::{TagKey, ValueKind};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type.
#[derive(Error, Debug)]
pub enum ErrorType {
    /// Configuration error.
    #[error("Configuration Error ({0})")]
    Config(#[from] crate::config::ConfigError),
    /// I/O Error.
    #[error("Input/Output error ({:?})", .0)]
    Io(#[from] io::Error),
    /// Neither a file nor a directory was specified.
    #[error("No file, directory or text file specified.")]
    NoFileSpecified,
    /// Neither a tag value nor a parser was specified.
    #[error("No tags specified.")]
    NoTagsSpecified,
    /// The file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// The path exists, but is not a regular file.
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),
    /// The directory does not exist.
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    /// The path exists, but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// The file content is not audio in a format that matches the file extension.
    #[error("Not an audio file: {}", .0.display())]
    NotAnAudioFile(PathBuf),
    /// The manifest file is not a plain text file.
    #[error("Not a text file: {}", .0.display())]
    NotATextFile(PathBuf),
    /// File has an unknown file extension.
    #[error("File has unknown file type: {}", .0.display())]
    UnknownFileType(PathBuf),
    /// The tag name is not part of the supported vocabulary.
    #[error("Unknown tag: {0}")]
    UnknownTag(String),
    /// The value does not have the kind the tag requires.
    #[error("'{key}' is expected to be {expected}.")]
    TypeMismatch {
        /// The tag key.
        key: TagKey,
        /// The kind of value the tag requires.
        expected: ValueKind,
    },
    /// The number cannot be stored in the tag.
    #[error("'{key}' value {value} is out of range.")]
    ValueOutOfRange {
        /// The tag key.
        key: TagKey,
        /// The rejected value.
        value: u32,
    },
    /// Extracting a value from a file name failed.
    #[error(transparent)]
    Matcher(#[from] crate::matcher::MatcherError),
    /// Reading the tags of a file failed.
    #[error("Error while loading file: {}", .0.display())]
    Load(PathBuf, #[source] Box<ErrorType>),
    /// Writing the tags of a file failed.
    #[error("Error while saving file: {}", .0.display())]
    Save(PathBuf, #[source] Box<ErrorType>),
    /// Errors raised by the [`lofty`] crate.
    #[error("Audio file error")]
    Lofty(#[from] lofty::error::LoftyError),
    /// Errors raised by the [`id3`] crate.
    #[cfg(feature = "id3")]
    #[error("ID3 tag error")]
    Id3(#[from] id3::Error),
    /// Errors raised by the [`metaflac`] crate.
    #[cfg(feature = "flac")]
    #[error("FLAC tag error")]
    Flac(#[from] metaflac::Error),
}

impl ErrorType {
    /// Whether this error signals that there was nothing to do.
    ///
    /// These are not failures, so the process exits successfully.
    #[must_use]
    pub fn is_expected_termination(&self) -> bool {
        matches!(self, Self::NoFileSpecified | Self::NoTagsSpecified)
    }
}

/// Convenience type.
pub type Result<T> = std::result::Result<T, ErrorType>;
