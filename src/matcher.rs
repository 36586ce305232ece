// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Extract track titles and track numbers from file names.
//!
//! All functions in this module are pure: they take a file name (which may also be a full path)
//! and a [`Pattern`] and return the extracted value. The pattern is always applied to the whole
//! string and the first match (group 0) is used.

use itertools::Itertools;
use regex::Regex;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Articles, coordinating conjunctions and prepositions that are not capitalized in titles
/// unless they are the first or last word.
///
/// "but" and "for" are both conjunctions and prepositions and only listed once.
const MINOR_WORDS: [&str; 36] = [
    // Articles
    "a", "an", "the", //
    // Coordinating conjunctions
    "for", "and", "nor", "but", "or", "yet", "so", //
    // Prepositions
    "amid", "anti", "as", "at", "by", "down", "from", "in", "into", "like", "near", "of", "off",
    "on", "onto", "over", "past", "per", "plus", "save", "than", "to", "up", "upon", "via",
    "with",
];

/// Runs of underscores.
static UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("_+").expect("static regex should compile"));
/// Runs of hyphens.
static HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("-+").expect("static regex should compile"));
/// Two or more consecutive spaces.
static MULTIPLE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(" {2,}").expect("static regex should compile"));

/// Errors raised while extracting values from file names.
#[derive(Error, Debug)]
pub enum MatcherError {
    /// The pattern is not a valid regular expression.
    #[error("Invalid regular expression: {pattern}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: Box<fancy_regex::Error>,
    },
    /// The pattern did not match, but a match is mandatory.
    #[error("Pattern {pattern} does not match {input:?}")]
    NoMatch {
        /// The pattern text.
        pattern: String,
        /// The string the pattern was applied to.
        input: String,
    },
    /// The pattern matched, but the matched text is not a track number.
    #[error("Cannot parse track number from {text:?}")]
    TrackNumberParse {
        /// The matched text.
        text: String,
        /// The underlying parse error.
        #[source]
        source: ParseIntError,
    },
    /// The regex engine failed while searching for a match.
    #[error("Failed to apply pattern {pattern} to {input:?}")]
    Extraction {
        /// The pattern text.
        pattern: String,
        /// The string the pattern was applied to.
        input: String,
        /// The underlying regex error.
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

/// A compiled regular expression used for extraction.
///
/// Look-around assertions are supported, so patterns like `(?<=\d\d\s).+(?=\.flac)` can select
/// the title part of a file name without including the surrounding text in the match.
#[derive(Debug, Clone)]
pub struct Pattern(fancy_regex::Regex);

impl Pattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::InvalidPattern`] if the pattern is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, MatcherError> {
        fancy_regex::Regex::new(pattern)
            .map(Self)
            .map_err(|err| MatcherError::InvalidPattern {
                pattern: pattern.to_string(),
                source: Box::new(err),
            })
    }

    /// The pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Find the first match in `input`, if any.
    fn find<'a>(&self, input: &'a str) -> Result<Option<&'a str>, MatcherError> {
        self.0
            .find(input)
            .map(|found| found.map(|m| m.as_str()))
            .map_err(|err| MatcherError::Extraction {
                pattern: self.to_string(),
                input: input.to_string(),
                source: Box::new(err),
            })
    }

    /// Find the first match in `input` and fail if there is none.
    fn find_required<'a>(&self, input: &'a str) -> Result<&'a str, MatcherError> {
        self.find(input)?.ok_or_else(|| MatcherError::NoMatch {
            pattern: self.to_string(),
            input: input.to_string(),
        })
    }
}

impl FromStr for Pattern {
    type Err = MatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract the matched text without any processing except trimming surrounding whitespace.
///
/// # Errors
///
/// Returns [`MatcherError::NoMatch`] if the pattern does not match.
pub fn extract_title_as_is(file_name: &str, pattern: &Pattern) -> Result<String, MatcherError> {
    pattern
        .find_required(file_name)
        .map(|title| title.trim().to_string())
}

/// Extract the matched text and capitalize it as a title.
///
/// The match is split on single spaces. The first and the last non-empty word are always
/// capitalized. Articles, coordinating conjunctions and prepositions in between are lowercased
/// and all other words are capitalized. Consecutive spaces are kept as they are. Letters whose
/// uppercase form has more than one character, such as 'ß', stay lowercase.
///
/// # Errors
///
/// Returns [`MatcherError::NoMatch`] if the pattern does not match.
pub fn extract_title_capitalize(file_name: &str, pattern: &Pattern) -> Result<String, MatcherError> {
    let title = pattern.find_required(file_name)?;
    Ok(title_case(title).trim().to_string())
}

/// Replace underscores, hyphens and multiple spaces in the file name by single spaces, then
/// extract the title like [`extract_title_capitalize`].
///
/// Note that the pattern is applied to the cleaned up file name, not to the original one. A
/// pattern that expects literal underscores or hyphens will therefore never match.
///
/// # Errors
///
/// Returns [`MatcherError::NoMatch`] if the pattern does not match the cleaned up file name.
pub fn extract_title_cleanup_and_capitalize(
    file_name: &str,
    pattern: &Pattern,
) -> Result<String, MatcherError> {
    let cleaned = cleanup(file_name);
    extract_title_capitalize(&cleaned, pattern).map(|title| title.trim().to_string())
}

/// Extract the track number from the file name.
///
/// If the pattern does not match, the track number is `0`.
///
/// # Errors
///
/// Returns [`MatcherError::TrackNumberParse`] if the matched text is not a number and
/// [`MatcherError::Extraction`] if the regex engine fails.
pub fn extract_track_number(file_name: &str, pattern: &Pattern) -> Result<u32, MatcherError> {
    let Some(text) = pattern.find(file_name)? else {
        return Ok(0);
    };

    text.trim()
        .parse::<u32>()
        .map_err(|source| MatcherError::TrackNumberParse {
            text: text.to_string(),
            source,
        })
}

/// Collapse runs of underscores, runs of hyphens and multiple spaces into single spaces.
fn cleanup(value: &str) -> String {
    let value = UNDERSCORES.replace_all(value, " ");
    let value = HYPHENS.replace_all(&value, " ");
    MULTIPLE_SPACES.replace_all(&value, " ").into_owned()
}

/// Apply title capitalization to each space-separated word.
///
/// Leading and trailing spaces produce empty words, which do not count as first or last word.
fn title_case(value: &str) -> String {
    let words: Vec<&str> = value.split(' ').collect();
    let first = words.iter().position(|word| !word.is_empty());
    let last = words.iter().rposition(|word| !word.is_empty());
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            if Some(i) == first || Some(i) == last || !is_minor_word(word) {
                capitalize_first(word)
            } else {
                word.to_lowercase()
            }
        })
        .join(" ")
}

/// Check if the word is an article, coordinating conjunction or preposition.
fn is_minor_word(word: &str) -> bool {
    let word = word.to_lowercase();
    MINOR_WORDS.contains(&word.as_str())
}

/// Lowercase the word and uppercase its first alphabetic character.
///
/// Characters without a single-character uppercase form are left lowercase.
///
/// Words joined by hyphens (or, if there are none, by underscores) are capitalized separately.
fn capitalize_first(word: &str) -> String {
    if word.contains('-') {
        return word.split('-').map(capitalize_first).join("-");
    }

    if word.contains('_') {
        return word.split('_').map(capitalize_first).join("_");
    }

    let word = word.to_lowercase();
    match word.char_indices().find(|(_, c)| c.is_alphabetic()) {
        Some((pos, c)) => {
            let mut capitalized = String::with_capacity(word.len());
            capitalized.push_str(&word[..pos]);
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(upper), None) => capitalized.push(upper),
                _ => capitalized.push(c),
            }
            capitalized.push_str(&word[pos + c.len_utf8()..]);
            capitalized
        }
        None => word,
    }
}
