// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for ID3 tags.

use crate::tag::{guess_file_type, Tag, TagKey, TagType, TagValue};
use crate::Error;
use id3::{
    frame::{Comment, Lyrics},
    TagLike, Timestamp, Version,
};
use std::path::Path;

/// Language code used for new comment and lyrics frames.
const DEFAULT_LANGUAGE: &str = "eng";

/// The container format that carries the ID3 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// MPEG audio file (tag at the start of the file).
    Mpeg,
    /// RIFF WAVE file (tag in an `id3 ` chunk).
    Wav,
    /// AIFF file (tag in an `ID3 ` chunk).
    Aiff,
}

impl Container {
    /// The file type the content of this container is detected as.
    const fn file_type(self) -> lofty::file::FileType {
        match self {
            Container::Mpeg => lofty::file::FileType::Mpeg,
            Container::Wav => lofty::file::FileType::Wav,
            Container::Aiff => lofty::file::FileType::Aiff,
        }
    }
}

/// ID3 frame ID.
#[derive(Debug)]
enum FrameId<'a> {
    /// Text frame.
    Text(&'a str),
    /// Comment frame (`COMM`) without description.
    Comment,
    /// Unsynchronised lyrics frame (`USLT`).
    Lyrics,
    /// Number part of a `TRCK` frame.
    Track,
    /// Total part of a `TRCK` frame.
    TotalTracks,
    /// Number part of a `TPOS` frame.
    Disc,
    /// Total part of a `TPOS` frame.
    TotalDiscs,
    /// Recording year, depending on the tag version.
    Year,
}

/// ID3 tag (version 2).
#[derive(Debug)]
pub struct ID3v2Tag {
    /// The underlying tag data.
    data: id3::Tag,
    /// The container the tag is written to.
    container: Container,
    /// The version the tag is written as.
    version: Version,
}

impl ID3v2Tag {
    #[cfg(test)]
    pub fn with_version(version: Version) -> Self {
        ID3v2Tag {
            data: id3::Tag::with_version(version),
            container: Container::Mpeg,
            version,
        }
    }

    /// Read the ID3 tag from the path.
    ///
    /// Files without an ID3 tag start with an empty tag. The file content must be audio in the
    /// given container format, otherwise [`Error::NotAnAudioFile`] is returned.
    pub fn read_from_path(
        path: impl AsRef<Path>,
        container: Container,
        version: Version,
    ) -> crate::Result<Self> {
        let file_type = guess_file_type(path.as_ref())?;
        if file_type != Some(container.file_type()) {
            log::debug!(
                "Detected {file_type:?} instead of {container:?} content in {}",
                path.as_ref().display()
            );
            return Err(Error::NotAnAudioFile(path.as_ref().to_path_buf()));
        }

        let result = match container {
            Container::Mpeg => id3::Tag::read_from_path(&path),
            Container::Wav => id3::Tag::read_from_wav_path(&path),
            Container::Aiff => id3::Tag::read_from_aiff_path(&path),
        };
        let data = match result {
            Ok(data) => data,
            Err(id3::Error {
                kind: id3::ErrorKind::NoTag,
                ..
            }) => {
                log::debug!(
                    "No ID3 tag found in {}, starting with an empty tag",
                    path.as_ref().display()
                );
                id3::Tag::with_version(version)
            }
            Err(err) => return Err(err.into()),
        };
        Ok(ID3v2Tag {
            data,
            container,
            version,
        })
    }

    /// Get the ID3 frame for a tag key.
    fn tag_key_to_frame(key: TagKey) -> FrameId<'static> {
        match key {
            TagKey::Album => FrameId::Text("TALB"),
            TagKey::AlbumArtist => FrameId::Text("TPE2"),
            TagKey::Artist => FrameId::Text("TPE1"),
            TagKey::Comment => FrameId::Comment,
            TagKey::Compilation => FrameId::Text("TCMP"),
            TagKey::Composer => FrameId::Text("TCOM"),
            TagKey::DiscNumber => FrameId::Disc,
            TagKey::Genre => FrameId::Text("TCON"),
            TagKey::Isrc => FrameId::Text("TSRC"),
            TagKey::Lyrics => FrameId::Lyrics,
            TagKey::TotalDiscs => FrameId::TotalDiscs,
            TagKey::TotalTracks => FrameId::TotalTracks,
            TagKey::TrackNumber => FrameId::Track,
            TagKey::TrackTitle => FrameId::Text("TIT2"),
            TagKey::Year => FrameId::Year,
        }
    }

    /// Get the content of a text frame as string.
    fn get_text(&self, frame_id: &str) -> Option<&str> {
        self.data.get(frame_id).and_then(|frame| frame.content().text())
    }

    /// Get the recording year.
    fn year(&self) -> Option<u32> {
        self.data
            .date_recorded()
            .map(|timestamp| timestamp.year)
            .or_else(|| self.data.year())
            .and_then(|year| u32::try_from(year).ok())
    }

    /// Set the recording year in the frame that matches the output version.
    fn set_year(&mut self, year: u32) {
        let Ok(year) = i32::try_from(year) else {
            log::warn!("Year {year} is out of range, ignoring it");
            return;
        };
        if self.version == Version::Id3v24 {
            self.data.remove_year();
            self.data.set_date_recorded(Timestamp {
                year,
                month: None,
                day: None,
                hour: None,
                minute: None,
                second: None,
            });
        } else {
            self.data.remove_date_recorded();
            self.data.set_year(year);
        }
    }
}

/// Extract the number from a value for a numeric frame.
fn number(key: TagKey, value: &TagValue) -> Option<u32> {
    let number = value.as_number();
    if number.is_none() {
        log::warn!("Ignoring non-numeric value {value:?} for {key}");
    }
    number
}

impl Tag for ID3v2Tag {
    fn tag_type(&self) -> TagType {
        match self.data.version() {
            Version::Id3v22 => TagType::ID3v22,
            Version::Id3v23 => TagType::ID3v23,
            Version::Id3v24 => TagType::ID3v24,
        }
    }

    fn get(&self, key: TagKey) -> Option<TagValue> {
        match Self::tag_key_to_frame(key) {
            FrameId::Text(id) => self
                .get_text(id)
                .and_then(|text| TagValue::from_stored(key, text)),
            FrameId::Comment => self
                .data
                .comments()
                .find(|comment| comment.description.is_empty())
                .or_else(|| self.data.comments().next())
                .map(|comment| TagValue::from(comment.text.as_str())),
            FrameId::Lyrics => self
                .data
                .lyrics()
                .next()
                .map(|lyrics| TagValue::from(lyrics.text.as_str())),
            FrameId::Track => self.data.track().map(TagValue::Number),
            FrameId::TotalTracks => self.data.total_tracks().map(TagValue::Number),
            FrameId::Disc => self.data.disc().map(TagValue::Number),
            FrameId::TotalDiscs => self.data.total_discs().map(TagValue::Number),
            FrameId::Year => self.year().map(TagValue::Number),
        }
    }

    fn clear(&mut self, key: TagKey) {
        match Self::tag_key_to_frame(key) {
            FrameId::Text(id) => drop(self.data.remove(id)),
            FrameId::Comment => self.data.remove_comment(Some(""), None),
            FrameId::Lyrics => self.data.remove_all_lyrics(),
            FrameId::Track => self.data.remove_track(),
            FrameId::TotalTracks => self.data.remove_total_tracks(),
            FrameId::Disc => self.data.remove_disc(),
            FrameId::TotalDiscs => self.data.remove_total_discs(),
            FrameId::Year => {
                self.data.remove_year();
                self.data.remove_date_recorded();
            }
        }
    }

    fn set(&mut self, key: TagKey, value: &TagValue) {
        match Self::tag_key_to_frame(key) {
            FrameId::Text(id) => self.data.set_text(id, value.to_string()),
            FrameId::Comment => {
                self.data.remove_comment(Some(""), None);
                drop(self.data.add_frame(Comment {
                    lang: DEFAULT_LANGUAGE.to_string(),
                    description: String::new(),
                    text: value.to_string(),
                }));
            }
            FrameId::Lyrics => {
                self.data.remove_all_lyrics();
                drop(self.data.add_frame(Lyrics {
                    lang: DEFAULT_LANGUAGE.to_string(),
                    description: String::new(),
                    text: value.to_string(),
                }));
            }
            FrameId::Track => {
                if let Some(number) = number(key, value) {
                    self.data.set_track(number);
                }
            }
            FrameId::TotalTracks => {
                if let Some(number) = number(key, value) {
                    self.data.set_total_tracks(number);
                }
            }
            FrameId::Disc => {
                if let Some(number) = number(key, value) {
                    self.data.set_disc(number);
                }
            }
            FrameId::TotalDiscs => {
                if let Some(number) = number(key, value) {
                    self.data.set_total_discs(number);
                }
            }
            FrameId::Year => {
                if let Some(number) = number(key, value) {
                    self.set_year(number);
                }
            }
        }
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        match self.container {
            Container::Mpeg => self.data.write_to_path(path, self.version)?,
            Container::Wav => self.data.write_to_wav_path(path, self.version)?,
            Container::Aiff => self.data.write_to_aiff_path(path, self.version)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;

    macro_rules! add_test_get_and_set_with_id3_version {
        ($tagkey:expr, $value:expr, $version:expr, $fnsuffix:ident) => {
            paste! {
                #[test]
                fn [<test_get_and_set_ $fnsuffix>]() {
                    let mut tag = ID3v2Tag::with_version($version);
                    assert!(tag.get($tagkey).is_none());

                    let value = TagValue::from($value);
                    tag.set($tagkey, &value);
                    assert_eq!(tag.get($tagkey), Some(value));

                    tag.clear($tagkey);
                    assert!(tag.get($tagkey).is_none());
                }
            }
        };
    }
    macro_rules! add_test_get_and_set_all_id3_versions {
        ($tagkey:expr, $value:expr, $fnsuffix:ident) => {
            paste! {
            add_test_get_and_set_with_id3_version!($tagkey, $value, Version::Id3v22, [< $fnsuffix _id3v22>]);
            add_test_get_and_set_with_id3_version!($tagkey, $value, Version::Id3v23, [< $fnsuffix _id3v23>]);
            add_test_get_and_set_with_id3_version!($tagkey, $value, Version::Id3v24, [< $fnsuffix _id3v24>]);
            }
        };
    }

    add_test_get_and_set_all_id3_versions!(TagKey::Album, "Example Value", album);
    add_test_get_and_set_all_id3_versions!(TagKey::AlbumArtist, "Example Value", albumartist);
    add_test_get_and_set_all_id3_versions!(TagKey::Artist, "Example Value", artist);
    add_test_get_and_set_all_id3_versions!(TagKey::Comment, "Example Value", comment);
    add_test_get_and_set_all_id3_versions!(TagKey::Compilation, 1u32, compilation);
    add_test_get_and_set_all_id3_versions!(TagKey::Composer, "Example Value", composer);
    add_test_get_and_set_all_id3_versions!(TagKey::DiscNumber, 2u32, discnumber);
    add_test_get_and_set_all_id3_versions!(TagKey::Genre, "Hard Bop", genre);
    add_test_get_and_set_all_id3_versions!(TagKey::Isrc, "USRC17607839", isrc);
    add_test_get_and_set_all_id3_versions!(TagKey::Lyrics, "Example Value", lyrics);
    add_test_get_and_set_all_id3_versions!(TagKey::TotalDiscs, 3u32, totaldiscs);
    add_test_get_and_set_all_id3_versions!(TagKey::TotalTracks, 12u32, totaltracks);
    add_test_get_and_set_all_id3_versions!(TagKey::TrackNumber, 7u32, tracknumber);
    add_test_get_and_set_all_id3_versions!(TagKey::TrackTitle, "Example Value", tracktitle);
    add_test_get_and_set_all_id3_versions!(TagKey::Year, 1994u32, year);

    #[test]
    fn test_track_number_and_total_share_frame() {
        let mut tag = ID3v2Tag::with_version(Version::Id3v24);
        tag.set(TagKey::TrackNumber, &TagValue::Number(3));
        tag.set(TagKey::TotalTracks, &TagValue::Number(12));
        assert_eq!(tag.get_text("TRCK"), Some("3/12"));
        assert_eq!(tag.get(TagKey::TrackNumber), Some(TagValue::Number(3)));
        assert_eq!(tag.get(TagKey::TotalTracks), Some(TagValue::Number(12)));
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let mut tag = ID3v2Tag::with_version(Version::Id3v23);
        tag.set(TagKey::Comment, &TagValue::from("first"));
        tag.set(TagKey::Comment, &TagValue::from("second"));
        assert_eq!(tag.data.comments().count(), 1);
        assert_eq!(tag.get(TagKey::Comment), Some(TagValue::from("second")));
    }

    #[test]
    fn test_year_frame_depends_on_version() {
        let mut tag = ID3v2Tag::with_version(Version::Id3v24);
        tag.set(TagKey::Year, &TagValue::Number(2001));
        assert!(tag.data.get("TDRC").is_some());
        assert!(tag.data.get("TYER").is_none());

        let mut tag = ID3v2Tag::with_version(Version::Id3v23);
        tag.set(TagKey::Year, &TagValue::Number(2001));
        assert!(tag.data.get("TDRC").is_none());
        assert_eq!(tag.get_text("TYER"), Some("2001"));
    }

    #[test]
    fn test_numeric_key_ignores_text() {
        let mut tag = ID3v2Tag::with_version(Version::Id3v24);
        tag.set(TagKey::TrackNumber, &TagValue::from("one"));
        assert!(tag.get(TagKey::TrackNumber).is_none());
    }

    #[test]
    fn test_tag_type() {
        assert_eq!(
            ID3v2Tag::with_version(Version::Id3v22).tag_type(),
            TagType::ID3v22
        );
        assert_eq!(
            ID3v2Tag::with_version(Version::Id3v23).tag_type(),
            TagType::ID3v23
        );
        assert_eq!(
            ID3v2Tag::with_version(Version::Id3v24).tag_type(),
            TagType::ID3v24
        );
    }

    #[test]
    fn test_read_untagged_mpeg_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("01 gloomy sky.mp3");
        let mut content = vec![0xFF, 0xFB, 0x90, 0x00];
        content.resize(256, 0);
        std::fs::write(&path, content).unwrap();

        let tag = ID3v2Tag::read_from_path(&path, Container::Mpeg, Version::Id3v23).unwrap();
        assert_eq!(tag.tag_type(), TagType::ID3v23);
        assert!(tag.get(TagKey::TrackTitle).is_none());
    }

    #[test]
    fn test_read_text_file_with_audio_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.mp3");
        std::fs::write(&path, "These are my notes, not a song.\n").unwrap();
        assert!(matches!(
            ID3v2Tag::read_from_path(&path, Container::Mpeg, Version::Id3v24),
            Err(Error::NotAnAudioFile(_))
        ));
    }

    #[test]
    fn test_read_wrong_container() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("track.mp3");
        let mut content = b"RIFF\x24\x00\x00\x00WAVE".to_vec();
        content.resize(64, 0);
        std::fs::write(&path, content).unwrap();
        assert!(matches!(
            ID3v2Tag::read_from_path(&path, Container::Mpeg, Version::Id3v24),
            Err(Error::NotAnAudioFile(_))
        ));
    }
}
