// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! The [`TaggedFile`] struct represents a file that contains tags.

use crate::tag::{read_tag_from_path, Tag, TagKey, TagType, TagValue};
use crate::{Config, Error};
use std::fmt;
use std::path::{Path, PathBuf};

/// An audio file and its tag.
pub struct TaggedFile {
    /// Path of the file.
    pub path: PathBuf,
    /// The tag that is read from and written to the file.
    content: Box<dyn Tag>,
}

impl fmt::Debug for TaggedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_tuple("TaggedFile")
            .field(&self.path)
            .field(&self.content.tag_type())
            .finish()
    }
}

impl TaggedFile {
    /// Creates a [`TaggedFile`] from the path.
    ///
    /// # Errors
    ///
    /// Returns an error in case the file at the given path does not exist, is not a regular file,
    /// has an unsupported file type or its tags cannot be read.
    pub fn read_from_path(config: &Config, path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        let content = read_tag_from_path(config, path).map_err(|err| match err {
            Error::UnknownFileType(_) => err,
            err => Error::Load(path.to_path_buf(), Box::new(err)),
        })?;
        log::debug!(
            "Loaded {:?} tag from {}",
            content.tag_type(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// The type of the tag in this file.
    #[must_use]
    pub fn tag_type(&self) -> TagType {
        self.content.tag_type()
    }

    /// Returns the first value for the given [`TagKey`].
    #[must_use]
    pub fn first_tag_value(&self, key: TagKey) -> Option<TagValue> {
        self.content.get(key)
    }

    /// Set the value for the given [`TagKey`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value kind does not match the key, or
    /// [`Error::ValueOutOfRange`] if the number cannot be stored.
    pub fn set_tag_value(&mut self, key: TagKey, value: &TagValue) -> crate::Result<()> {
        key.check_value(value)?;

        log::debug!("Setting {key} to {value:?} in {}", self.path.display());
        self.content.set(key, value);
        Ok(())
    }

    /// Returns the first value for the tag with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTag`] if no tag with that name exists.
    pub fn get_tag(&self, name: &str) -> crate::Result<Option<TagValue>> {
        let key: TagKey = name.parse()?;
        Ok(self.first_tag_value(key))
    }

    /// Set the value for the tag with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTag`] if no tag with that name exists or [`Error::TypeMismatch`]
    /// if the value kind does not match the tag.
    pub fn set_tag(&mut self, name: &str, value: &TagValue) -> crate::Result<()> {
        let key: TagKey = name.parse()?;
        self.set_tag_value(key, value)
    }

    /// Write pending changes back to the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Save`] if the file cannot be written.
    pub fn save(&mut self) -> crate::Result<()> {
        self.content
            .write_to_path(&self.path)
            .map_err(|err| Error::Save(self.path.clone(), Box::new(err)))?;
        log::debug!("Saved tags to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Create an MPEG audio file without tags.
    fn untagged_file(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut content = vec![0xFF, 0xFB, 0x90, 0x00];
        content.resize(256, 0);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.mp3");
        assert!(matches!(
            TaggedFile::read_from_path(&Config::default(), &path),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("album.mp3");
        fs::create_dir(&path).unwrap();
        assert!(matches!(
            TaggedFile::read_from_path(&Config::default(), &path),
            Err(Error::NotAFile(_))
        ));
    }

    #[test]
    fn test_load_unknown_file_type() {
        let dir = TempDir::new().unwrap();
        let path = untagged_file(&dir, "cover.jpg");
        assert!(matches!(
            TaggedFile::read_from_path(&Config::default(), &path),
            Err(Error::UnknownFileType(_))
        ));
    }

    #[cfg(feature = "flac")]
    #[test]
    fn test_load_invalid_flac() {
        let dir = TempDir::new().unwrap();
        let path = untagged_file(&dir, "broken.flac");
        assert!(matches!(
            TaggedFile::read_from_path(&Config::default(), &path),
            Err(Error::Load(_, _))
        ));
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_load_text_file_with_audio_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.mp3");
        fs::write(&path, "These are my notes, not a song.\n").unwrap();
        let result = TaggedFile::read_from_path(&Config::default(), &path);
        assert!(matches!(
            result,
            Err(Error::Load(_, ref err)) if matches!(**err, Error::NotAnAudioFile(_))
        ));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "These are my notes, not a song.\n"
        );
    }

    #[test]
    fn test_load_text_file_with_opus_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.opus");
        fs::write(&path, "These are my notes, not a song.\n").unwrap();
        assert!(matches!(
            TaggedFile::read_from_path(&Config::default(), &path),
            Err(Error::Load(_, _))
        ));
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_set_get_and_save_mp3() {
        let dir = TempDir::new().unwrap();
        let path = untagged_file(&dir, "01 gloomy sky.mp3");
        let config = Config::default();

        let mut file = TaggedFile::read_from_path(&config, &path).unwrap();
        assert_eq!(file.tag_type(), TagType::ID3v24);
        assert_eq!(file.get_tag("albumartist").unwrap(), None);

        file.set_tag("tracktitle", &TagValue::from("gloomy sky"))
            .unwrap();
        file.set_tag("tracknumber", &TagValue::Number(1)).unwrap();
        file.save().unwrap();

        let file = TaggedFile::read_from_path(&config, &path).unwrap();
        assert_eq!(
            file.get_tag("tracktitle").unwrap(),
            Some(TagValue::from("gloomy sky"))
        );
        assert_eq!(
            file.first_tag_value(TagKey::TrackNumber),
            Some(TagValue::Number(1))
        );
        assert!(file.first_tag_value(TagKey::AlbumArtist).is_none());
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_unknown_tag_name() {
        let dir = TempDir::new().unwrap();
        let path = untagged_file(&dir, "track.mp3");
        let mut file = TaggedFile::read_from_path(&Config::default(), &path).unwrap();
        assert!(matches!(
            file.get_tag("Wolololo!"),
            Err(Error::UnknownTag(_))
        ));
        assert!(matches!(
            file.set_tag("Wolololo!", &TagValue::from("value")),
            Err(Error::UnknownTag(_))
        ));
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_type_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = untagged_file(&dir, "track.mp3");
        let mut file = TaggedFile::read_from_path(&Config::default(), &path).unwrap();
        assert!(matches!(
            file.set_tag("tracktitle", &TagValue::Number(45)),
            Err(Error::TypeMismatch {
                key: TagKey::TrackTitle,
                ..
            })
        ));
        assert!(matches!(
            file.set_tag_value(TagKey::Year, &TagValue::from("nineteen")),
            Err(Error::TypeMismatch { key: TagKey::Year, .. })
        ));
    }

    #[cfg(feature = "id3")]
    #[test]
    fn test_year_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = untagged_file(&dir, "track.mp3");
        let mut file = TaggedFile::read_from_path(&Config::default(), &path).unwrap();
        assert!(matches!(
            file.set_tag("year", &TagValue::Number(3_000_000_000)),
            Err(Error::ValueOutOfRange {
                key: TagKey::Year,
                value: 3_000_000_000
            })
        ));
        assert!(file.first_tag_value(TagKey::Year).is_none());
    }
}
