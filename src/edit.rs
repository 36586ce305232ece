// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Write tags to audio files.
//!
//! An [`EditRequest`] describes a single run: which files to edit, the tag values to write, and
//! the patterns used to derive the track title and track number from each file's path.

use crate::manifest::Manifest;
use crate::matcher::{self, MatcherError, Pattern};
use crate::scanner::find_target_paths;
use crate::tag::{TagKey, TagValue};
use crate::{Config, Error, TaggedFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Policy used to derive the track title from a file path.
///
/// Parsers are applied in the order of the variants, so the last configured one determines the
/// title that is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TitleParser {
    /// Title case with minor words in lowercase.
    Capitalize,
    /// The matched text without modifications.
    AsIs,
    /// Separators are replaced with spaces before applying title case.
    Clean,
}

impl TitleParser {
    /// Extract the title from the file name.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::NoMatch`] if the pattern does not match.
    pub fn extract(self, file_name: &str, pattern: &Pattern) -> Result<String, MatcherError> {
        match self {
            Self::Capitalize => matcher::extract_title_capitalize(file_name, pattern),
            Self::AsIs => matcher::extract_title_as_is(file_name, pattern),
            Self::Clean => matcher::extract_title_cleanup_and_capitalize(file_name, pattern),
        }
    }
}

/// Whether a pattern was actually given. Empty and whitespace-only patterns count as not given.
fn is_given(pattern: &str) -> bool {
    !pattern.trim().is_empty()
}

/// Everything a single run needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditRequest {
    /// Path of a single audio file.
    pub file: Option<PathBuf>,
    /// Directory containing audio files (takes precedence over `file`).
    pub files_directory: Option<PathBuf>,
    /// Tag values written to every file.
    pub tags: BTreeMap<TagKey, TagValue>,
    /// Patterns for the title parsers.
    pub title_patterns: BTreeMap<TitleParser, String>,
    /// Pattern for the track number.
    pub track_number_pattern: Option<String>,
}

impl EditRequest {
    /// Override fields with the values present in the manifest.
    ///
    /// An empty pattern in the manifest replaces a pattern from the command line, which disables
    /// that parser.
    pub fn merge_manifest(&mut self, manifest: Manifest) {
        if manifest.file.is_some() {
            self.file = manifest.file;
        }
        if manifest.files_directory.is_some() {
            self.files_directory = manifest.files_directory;
        }
        if manifest.track_number_pattern.is_some() {
            self.track_number_pattern = manifest.track_number_pattern;
        }
        self.tags.extend(manifest.tags);
        self.title_patterns.extend(manifest.title_patterns);
    }

    /// Title patterns that were actually given, in application order.
    fn given_title_patterns(&self) -> impl Iterator<Item = (TitleParser, &str)> + '_ {
        self.title_patterns
            .iter()
            .map(|(parser, pattern)| (*parser, pattern.as_str()))
            .filter(|(_, pattern)| is_given(pattern))
    }

    /// The track number pattern, if it was actually given.
    fn given_track_number_pattern(&self) -> Option<&str> {
        self.track_number_pattern
            .as_deref()
            .filter(|pattern| is_given(pattern))
    }

    /// Whether this request changes anything.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.tags.is_empty()
            || self.given_title_patterns().next().is_some()
            || self.given_track_number_pattern().is_some()
    }

    /// Check that every tag value can be stored for its key.
    fn validate(&self) -> crate::Result<()> {
        self.tags
            .iter()
            .try_for_each(|(key, value)| key.check_value(value))
    }
}

/// Compiled patterns of an [`EditRequest`].
#[derive(Debug)]
struct Parsers {
    /// Title parsers in application order.
    titles: Vec<(TitleParser, Pattern)>,
    /// Track number parser.
    track_number: Option<Pattern>,
}

impl Parsers {
    /// Compile all patterns of the request.
    fn compile(request: &EditRequest) -> crate::Result<Self> {
        let titles = request
            .given_title_patterns()
            .map(|(parser, pattern)| Ok((parser, Pattern::new(pattern)?)))
            .collect::<Result<Vec<_>, MatcherError>>()?;
        let track_number = request
            .given_track_number_pattern()
            .map(Pattern::new)
            .transpose()?;
        Ok(Self {
            titles,
            track_number,
        })
    }

    /// Derive the tag values for a single file.
    fn derive(&self, path: &Path) -> crate::Result<BTreeMap<TagKey, TagValue>> {
        let file_name = path.to_string_lossy();
        let mut values = BTreeMap::new();
        for (parser, pattern) in &self.titles {
            let title = parser.extract(&file_name, pattern)?;
            values.insert(TagKey::TrackTitle, TagValue::Text(title));
        }
        if let Some(pattern) = &self.track_number {
            let number = matcher::extract_track_number(&file_name, pattern)?;
            values.insert(TagKey::TrackNumber, TagValue::Number(number));
        }
        Ok(values)
    }
}

/// Write the requested tags to all target files and return the paths of the edited files.
///
/// Files are processed one after another in sorted order. Values derived from the file path
/// override explicitly given values for the same tag. A failure aborts the run, but files that
/// were saved before are not restored.
///
/// # Errors
///
/// Returns [`Error::NoFileSpecified`] or [`Error::NoTagsSpecified`] if there is nothing to do, or
/// the first error that occurs while resolving, validating or editing files.
pub fn run(config: &Config, request: &EditRequest) -> crate::Result<Vec<PathBuf>> {
    let paths = find_target_paths(
        config,
        request.file.as_deref(),
        request.files_directory.as_deref(),
    )?;
    if !request.has_changes() {
        return Err(Error::NoTagsSpecified);
    }
    request.validate()?;
    let parsers = Parsers::compile(request)?;

    for path in &paths {
        edit_file(config, path, &request.tags, &parsers)?;
    }

    Ok(paths)
}

/// Write the tags to a single file.
fn edit_file(
    config: &Config,
    path: &Path,
    tags: &BTreeMap<TagKey, TagValue>,
    parsers: &Parsers,
) -> crate::Result<()> {
    let mut values = tags.clone();
    values.extend(parsers.derive(path)?);

    let mut tagged_file = TaggedFile::read_from_path(config, path)?;
    for (key, value) in &values {
        tagged_file.set_tag_value(*key, value)?;
    }
    tagged_file.save()?;

    log::info!("Wrote {} tags to {}", values.len(), path.display());
    Ok(())
}
