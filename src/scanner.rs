// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The scanner resolves the command line target into the list of audio files to tag.

use crate::tag::is_supported_path;
use crate::util::walk_dir;
use crate::{Config, Error};
use std::path::{Path, PathBuf};

/// Resolve the files that should be tagged.
///
/// If a directory is given, it takes precedence over the file. All files in the directory whose
/// extension is listed in the configuration are returned in sorted order, including files in
/// subdirectories if the configuration enables recursion. A single file is returned as-is, as
/// long as its file type is supported.
///
/// # Errors
///
/// Returns [`Error::NoFileSpecified`] if neither a file nor a directory is given, or an error if
/// the target does not exist, has the wrong kind or cannot be read.
pub fn find_target_paths(
    config: &Config,
    file: Option<&Path>,
    directory: Option<&Path>,
) -> crate::Result<Vec<PathBuf>> {
    match (file, directory) {
        (_, Some(directory)) => {
            if let Some(file) = file {
                log::debug!(
                    "Ignoring file {} because directory {} is given",
                    file.display(),
                    directory.display()
                );
            }
            find_files_in_directory(config, directory)
        }
        (Some(file), None) => {
            if !file.exists() {
                return Err(Error::FileNotFound(file.to_path_buf()));
            }
            if !file.is_file() {
                return Err(Error::NotAFile(file.to_path_buf()));
            }
            if !is_supported_path(file) {
                return Err(Error::UnknownFileType(file.to_path_buf()));
            }
            Ok(vec![file.to_path_buf()])
        }
        (None, None) => Err(Error::NoFileSpecified),
    }
}

/// Find all audio files in the directory.
fn find_files_in_directory(config: &Config, directory: &Path) -> crate::Result<Vec<PathBuf>> {
    if !directory.exists() {
        return Err(Error::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(Error::NotADirectory(directory.to_path_buf()));
    }

    let extensions = config.extensions();
    let is_wanted = |path: &PathBuf| {
        let has_extension = path
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .is_some_and(|extension| extensions.contains(&extension.to_ascii_lowercase()));
        if has_extension && !is_supported_path(path) {
            log::warn!("Skipping unsupported file {}", path.display());
            return false;
        }
        has_extension
    };

    let mut paths = vec![];
    for result in walk_dir(directory.to_path_buf()) {
        let (_, _, files) = result?;
        paths.extend(files.into_iter().filter(|path| is_wanted(path)));
        if !config.recursive() {
            break;
        }
    }
    paths.sort_unstable();

    if paths.is_empty() {
        log::warn!("No audio files found in {}", directory.display());
    } else {
        log::debug!(
            "Found {} audio files in {}",
            paths.len(),
            directory.display()
        );
    }

    Ok(paths)
}
