// Copyright (c) 2022 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for FLAC tags.

#![cfg(feature = "flac")]

use crate::tag::{Tag, TagKey, TagType, TagValue};
use std::fmt;
use std::path::Path;

/// FLAC tag.
pub struct FlacTag {
    /// The underlying tag data.
    data: metaflac::Tag,
}

impl fmt::Debug for FlacTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlacTag").finish_non_exhaustive()
    }
}

impl FlacTag {
    #[cfg(test)]
    pub fn new() -> Self {
        FlacTag {
            data: metaflac::Tag::new(),
        }
    }

    /// Read the FLAC tag from the path
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let data = metaflac::Tag::read_from_path(path)?;
        Ok(FlacTag { data })
    }

    /// Get the vorbis key name for a tag key, followed by alternative names that are read but
    /// never written.
    fn tag_key_to_frames(key: TagKey) -> &'static [&'static str] {
        match key {
            TagKey::Album => &["ALBUM"],
            TagKey::AlbumArtist => &["ALBUMARTIST"],
            TagKey::Artist => &["ARTIST"],
            TagKey::Comment => &["COMMENT", "DESCRIPTION"],
            TagKey::Compilation => &["COMPILATION"],
            TagKey::Composer => &["COMPOSER"],
            TagKey::DiscNumber => &["DISCNUMBER"],
            TagKey::Genre => &["GENRE"],
            TagKey::Isrc => &["ISRC"],
            TagKey::Lyrics => &["LYRICS", "UNSYNCEDLYRICS"],
            TagKey::TotalDiscs => &["DISCTOTAL", "TOTALDISCS"],
            TagKey::TotalTracks => &["TRACKTOTAL", "TOTALTRACKS"],
            TagKey::TrackNumber => &["TRACKNUMBER"],
            TagKey::TrackTitle => &["TITLE"],
            TagKey::Year => &["DATE", "YEAR"],
        }
    }
}

impl Tag for FlacTag {
    fn tag_type(&self) -> TagType {
        TagType::Flac
    }

    fn get(&self, key: TagKey) -> Option<TagValue> {
        Self::tag_key_to_frames(key)
            .iter()
            .find_map(|frame| {
                self.data
                    .get_vorbis(frame)
                    .and_then(|mut iterator| iterator.next())
            })
            .and_then(|value| TagValue::from_stored(key, value))
    }

    fn clear(&mut self, key: TagKey) {
        for frame in Self::tag_key_to_frames(key) {
            self.data.remove_vorbis(frame);
        }
    }

    fn set(&mut self, key: TagKey, value: &TagValue) {
        self.clear(key);
        if let Some(frame) = Self::tag_key_to_frames(key).first() {
            self.data.set_vorbis(*frame, vec![value.to_string()]);
        }
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        self.data.write_to_path(path)?;
        Ok(())
    }
}
