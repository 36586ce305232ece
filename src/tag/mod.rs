// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Tags and tag-related functions.

#[cfg(feature = "flac")]
mod flac;
mod generic;
#[cfg(feature = "id3")]
mod id3;

use crate::config::Config;
use crate::Error;
use lofty::file::FileType;
use lofty::probe::Probe;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

/// A tag key describes the kind of information in a generic, format-independent way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    /// Title of the release.
    Album,
    /// Artist(s) primarily credited on the release.
    AlbumArtist,
    /// Track Artist Name(s).
    Artist,
    /// Comment.
    Comment,
    /// 1 for Various Artist albums, otherwise 0 (compatible with iTunes).
    Compilation,
    /// Composer Name(s).
    Composer,
    /// Number of the disc in this release that contains this track.
    DiscNumber,
    /// Genre Name(s) of the track.
    Genre,
    /// International Standard Recording Code
    ///
    /// An international standard code for uniquely identifying sound recordings and music video
    /// recordings.
    Isrc,
    /// Lyrics.
    Lyrics,
    /// Total number of discs in this release.
    TotalDiscs,
    /// Total tracks on this disc.
    TotalTracks,
    /// Track number on the disc.
    TrackNumber,
    /// Track Title.
    TrackTitle,
    /// Release Year (YYYY).
    Year,
}

/// The kind of value a [`TagKey`] accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A sequence of characters.
    Text,
    /// A non-negative integer.
    Number,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("a sequence of characters"),
            Self::Number => f.write_str("a sequence of numbers"),
        }
    }
}

impl TagKey {
    /// All supported tag keys.
    pub const ALL: [TagKey; 15] = [
        TagKey::Album,
        TagKey::AlbumArtist,
        TagKey::Artist,
        TagKey::Comment,
        TagKey::Compilation,
        TagKey::Composer,
        TagKey::DiscNumber,
        TagKey::Genre,
        TagKey::Isrc,
        TagKey::Lyrics,
        TagKey::TotalDiscs,
        TagKey::TotalTracks,
        TagKey::TrackNumber,
        TagKey::TrackTitle,
        TagKey::Year,
    ];

    /// The name used on the command line and in manifest files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TagKey::Album => "album",
            TagKey::AlbumArtist => "albumartist",
            TagKey::Artist => "artist",
            TagKey::Comment => "comment",
            TagKey::Compilation => "compilation",
            TagKey::Composer => "composer",
            TagKey::DiscNumber => "discnumber",
            TagKey::Genre => "genre",
            TagKey::Isrc => "isrc",
            TagKey::Lyrics => "lyrics",
            TagKey::TotalDiscs => "totaldiscs",
            TagKey::TotalTracks => "totaltracks",
            TagKey::TrackNumber => "tracknumber",
            TagKey::TrackTitle => "tracktitle",
            TagKey::Year => "year",
        }
    }

    /// The kind of value this key accepts.
    #[must_use]
    pub const fn value_kind(self) -> ValueKind {
        match self {
            TagKey::Compilation
            | TagKey::DiscNumber
            | TagKey::TotalDiscs
            | TagKey::TotalTracks
            | TagKey::TrackNumber
            | TagKey::Year => ValueKind::Number,
            TagKey::Album
            | TagKey::AlbumArtist
            | TagKey::Artist
            | TagKey::Comment
            | TagKey::Composer
            | TagKey::Genre
            | TagKey::Isrc
            | TagKey::Lyrics
            | TagKey::TrackTitle => ValueKind::Text,
        }
    }

    /// Parse a raw string into a value of the kind this key accepts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if a numeric key receives a value that is not a number.
    pub fn parse_value(self, value: &str) -> crate::Result<TagValue> {
        match self.value_kind() {
            ValueKind::Text => Ok(TagValue::Text(value.to_string())),
            ValueKind::Number => value
                .trim()
                .parse::<u32>()
                .map(TagValue::Number)
                .map_err(|_| Error::TypeMismatch {
                    key: self,
                    expected: ValueKind::Number,
                }),
        }
    }

    /// Check that the value can be stored for this key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value has the wrong kind, or
    /// [`Error::ValueOutOfRange`] if a year does not fit into a signed 32-bit integer.
    pub fn check_value(self, value: &TagValue) -> crate::Result<()> {
        let expected = self.value_kind();
        if value.kind() != expected {
            return Err(Error::TypeMismatch {
                key: self,
                expected,
            });
        }
        match (self, value) {
            (TagKey::Year, TagValue::Number(year)) if i32::try_from(*year).is_err() => {
                Err(Error::ValueOutOfRange {
                    key: self,
                    value: *year,
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TagKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| Error::UnknownTag(s.to_string()))
    }
}

/// A tag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Text value.
    Text(String),
    /// Numeric value.
    Number(u32),
}

impl TagValue {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Number(_) => ValueKind::Number,
        }
    }

    /// Returns the number if this is a numeric value.
    #[must_use]
    pub const fn as_number(&self) -> Option<u32> {
        match self {
            Self::Text(_) => None,
            Self::Number(number) => Some(*number),
        }
    }

    /// Parse a value read from a tag for the given key.
    ///
    /// Numeric values are often stored with additional information, e.g. `3/12` for track
    /// numbers or `2001-05-04` for dates. Only the leading number is used, and `None` is
    /// returned if there is none.
    #[must_use]
    pub fn from_stored(key: TagKey, value: &str) -> Option<Self> {
        match key.value_kind() {
            ValueKind::Text => Some(Self::Text(value.to_string())),
            ValueKind::Number => {
                let value = value.trim();
                let end = value
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(value.len());
                value[..end].parse().ok().map(Self::Number)
            }
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        Self::Number(value)
    }
}

/// The tag type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagType {
    /// ID3v2.2 tag
    ID3v22,
    /// ID3v2.3 tag
    ID3v23,
    /// ID3v2.4 tag
    ID3v24,
    /// Vorbis tag from a FLAC file
    Flac,
    /// Vorbis comments from an Ogg Vorbis or Opus file
    VorbisComments,
    /// MP4 ilst atom
    Mp4,
    /// APEv2 tag
    Ape,
    /// Any other tag format handled by `lofty`
    Other,
}

/// A tag that can be read, modified and written back to a file.
pub trait Tag: fmt::Debug {
    /// Get the tag type.
    fn tag_type(&self) -> TagType;
    /// Get the first value for the tag key.
    fn get(&self, key: TagKey) -> Option<TagValue>;
    /// Set the value for the tag key, replacing all previous values.
    fn set(&mut self, key: TagKey, value: &TagValue);
    /// Remove all values for the tag key.
    fn clear(&mut self, key: TagKey);
    /// Write the tag to the file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write_to_path(&mut self, path: &Path) -> crate::Result<()>;
}

/// Lowercased extension of the path, if any.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(std::ffi::OsStr::to_str)
        .map(str::to_ascii_lowercase)
}

/// Check if a tag backend exists for the file at the given path.
#[must_use]
pub fn is_supported_path(path: &Path) -> bool {
    matches!(
        extension(path).as_deref(),
        Some("mp3" | "wav" | "aif" | "aiff" | "flac" | "ogg" | "opus" | "m4a" | "aac" | "wv")
    )
}

/// Detect the audio format from the file content, ignoring the file extension.
///
/// Returns `None` if the content is not in any format known to `lofty`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn guess_file_type(path: &Path) -> crate::Result<Option<FileType>> {
    let reader = BufReader::new(File::open(path)?);
    let probe = Probe::new(reader).guess_file_type()?;
    Ok(probe.file_type())
}

/// Read the tag from the path.
///
/// # Errors
///
/// Returns [`Error::UnknownFileType`] if no backend exists for the file extension, or the
/// backend's error if the file cannot be parsed.
#[cfg_attr(not(feature = "id3"), allow(unused_variables))]
pub fn read_tag_from_path(config: &Config, path: &Path) -> crate::Result<Box<dyn Tag>> {
    let tag: Box<dyn Tag> = match extension(path).as_deref() {
        #[cfg(feature = "id3")]
        Some("mp3") => Box::new(id3::ID3v2Tag::read_from_path(
            path,
            id3::Container::Mpeg,
            config.id3_version(),
        )?),
        #[cfg(feature = "id3")]
        Some("wav") => Box::new(id3::ID3v2Tag::read_from_path(
            path,
            id3::Container::Wav,
            config.id3_version(),
        )?),
        #[cfg(feature = "id3")]
        Some("aif" | "aiff") => Box::new(id3::ID3v2Tag::read_from_path(
            path,
            id3::Container::Aiff,
            config.id3_version(),
        )?),
        #[cfg(feature = "flac")]
        Some("flac") => Box::new(flac::FlacTag::read_from_path(path)?),
        Some("ogg" | "opus" | "m4a" | "aac" | "wv") => {
            Box::new(generic::GenericTag::read_from_path(path)?)
        }
        ext => {
            log::debug!("Unknown file extension {ext:?}");
            return Err(Error::UnknownFileType(path.to_path_buf()));
        }
    };
    Ok(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_key_names_roundtrip() {
        for key in TagKey::ALL {
            assert_eq!(key.name().parse::<TagKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_tag_key() {
        assert!(matches!(
            "Wolololo!".parse::<TagKey>(),
            Err(Error::UnknownTag(ref name)) if name == "Wolololo!"
        ));
        assert!("TrackTitle".parse::<TagKey>().is_err());
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(TagKey::TrackTitle.value_kind(), ValueKind::Text);
        assert_eq!(TagKey::Isrc.value_kind(), ValueKind::Text);
        assert_eq!(TagKey::TrackNumber.value_kind(), ValueKind::Number);
        assert_eq!(TagKey::Year.value_kind(), ValueKind::Number);
        assert_eq!(
            TagKey::ALL
                .into_iter()
                .filter(|key| key.value_kind() == ValueKind::Number)
                .count(),
            6
        );
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(
            TagKey::Year.parse_value(" 1994 ").unwrap(),
            TagValue::Number(1994)
        );
        assert_eq!(
            TagKey::Genre.parse_value("Hard Bop").unwrap(),
            TagValue::Text("Hard Bop".to_string())
        );
        assert!(matches!(
            TagKey::TrackNumber.parse_value("one"),
            Err(Error::TypeMismatch {
                key: TagKey::TrackNumber,
                expected: ValueKind::Number
            })
        ));
    }

    #[test]
    fn test_check_value() {
        assert!(TagKey::Year.check_value(&TagValue::Number(1997)).is_ok());
        assert!(TagKey::TrackNumber
            .check_value(&TagValue::Number(u32::MAX))
            .is_ok());
        assert!(matches!(
            TagKey::Year.check_value(&TagValue::Number(u32::MAX)),
            Err(Error::ValueOutOfRange {
                key: TagKey::Year,
                value: u32::MAX
            })
        ));
        assert!(matches!(
            TagKey::Year.check_value(&TagValue::from("1997")),
            Err(Error::TypeMismatch { key: TagKey::Year, .. })
        ));
    }

    #[test]
    fn test_value_from_stored() {
        assert_eq!(
            TagValue::from_stored(TagKey::TrackNumber, "3/12"),
            Some(TagValue::Number(3))
        );
        assert_eq!(
            TagValue::from_stored(TagKey::Year, "2001-05-04"),
            Some(TagValue::Number(2001))
        );
        assert_eq!(TagValue::from_stored(TagKey::Year, "unknown"), None);
        assert_eq!(
            TagValue::from_stored(TagKey::Artist, "3/12"),
            Some(TagValue::from("3/12"))
        );
    }

    #[test]
    fn test_is_supported_path() {
        assert!(is_supported_path(Path::new("01 Intro.MP3")));
        assert!(is_supported_path(Path::new("/music/01 Intro.flac")));
        assert!(is_supported_path(Path::new("01 Intro.aiff")));
        assert!(is_supported_path(Path::new("01 Intro.opus")));
        assert!(is_supported_path(Path::new("01 Intro.M4A")));
        assert!(is_supported_path(Path::new("01 Intro.wv")));
        assert!(!is_supported_path(Path::new("01 Intro.dsf")));
        assert!(!is_supported_path(Path::new("cover.jpg")));
        assert!(!is_supported_path(Path::new("README")));
    }

    #[test]
    fn test_read_unknown_file_type() {
        let config = Config::default();
        assert!(matches!(
            read_tag_from_path(&config, Path::new("cover.jpg")),
            Err(Error::UnknownFileType(_))
        ));
    }

    #[test]
    fn test_guess_file_type() {
        let dir = tempfile::TempDir::new().unwrap();

        let path = dir.path().join("notes.mp3");
        std::fs::write(&path, "These are my notes, not a song.\n").unwrap();
        assert_eq!(guess_file_type(&path).unwrap(), None);

        let path = dir.path().join("frames.txt");
        let mut content = vec![0xFF, 0xFB, 0x90, 0x00];
        content.resize(256, 0);
        std::fs::write(&path, content).unwrap();
        assert_eq!(guess_file_type(&path).unwrap(), Some(FileType::Mpeg));
    }
}
