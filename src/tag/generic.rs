// Copyright (c) 2025 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for the tag formats of Ogg Vorbis, Opus, MP4, AAC and WavPack files.
//!
//! These are handled by `lofty`, which picks the primary tag format of the detected container
//! (Vorbis comments, MP4 ilst atoms, ID3v2 or APEv2).

use crate::tag::{Tag, TagKey, TagType, TagValue};
use lofty::config::{ParseOptions, WriteOptions};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::ItemKey;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Tag of a file read with `lofty`.
pub struct GenericTag {
    /// The underlying tag data.
    data: lofty::tag::Tag,
}

impl fmt::Debug for GenericTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericTag")
            .field("tag_type", &self.data.tag_type())
            .finish_non_exhaustive()
    }
}

impl GenericTag {
    #[cfg(test)]
    pub fn new(tag_type: lofty::tag::TagType) -> Self {
        GenericTag {
            data: lofty::tag::Tag::new(tag_type),
        }
    }

    /// Read the primary tag from the path.
    ///
    /// The format is detected from the file content. Files without a tag start with an empty
    /// tag of the container's primary format.
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let tagged_file = Probe::new(reader)
            .options(ParseOptions::new().read_properties(false))
            .guess_file_type()?
            .read()?;

        let tag_type = tagged_file.primary_tag_type();
        let data = tagged_file.tag(tag_type).cloned().unwrap_or_else(|| {
            log::debug!(
                "No {tag_type:?} tag found in {}, starting with an empty tag",
                path.as_ref().display()
            );
            lofty::tag::Tag::new(tag_type)
        });
        Ok(GenericTag { data })
    }

    /// Get the item key that a tag key is written to.
    fn tag_key_to_item(key: TagKey) -> ItemKey {
        match key {
            TagKey::Album => ItemKey::AlbumTitle,
            TagKey::AlbumArtist => ItemKey::AlbumArtist,
            TagKey::Artist => ItemKey::TrackArtist,
            TagKey::Comment => ItemKey::Comment,
            TagKey::Compilation => ItemKey::FlagCompilation,
            TagKey::Composer => ItemKey::Composer,
            TagKey::DiscNumber => ItemKey::DiscNumber,
            TagKey::Genre => ItemKey::Genre,
            TagKey::Isrc => ItemKey::Isrc,
            TagKey::Lyrics => ItemKey::Lyrics,
            TagKey::TotalDiscs => ItemKey::DiscTotal,
            TagKey::TotalTracks => ItemKey::TrackTotal,
            TagKey::TrackNumber => ItemKey::TrackNumber,
            TagKey::TrackTitle => ItemKey::TrackTitle,
            TagKey::Year => ItemKey::RecordingDate,
        }
    }
}

impl Tag for GenericTag {
    fn tag_type(&self) -> TagType {
        match self.data.tag_type() {
            lofty::tag::TagType::VorbisComments => TagType::VorbisComments,
            lofty::tag::TagType::Mp4Ilst => TagType::Mp4,
            lofty::tag::TagType::Ape => TagType::Ape,
            lofty::tag::TagType::Id3v2 => TagType::ID3v24,
            _ => TagType::Other,
        }
    }

    fn get(&self, key: TagKey) -> Option<TagValue> {
        let value = self.data.get_string(&Self::tag_key_to_item(key));
        let value = match key {
            TagKey::Year => value.or_else(|| self.data.get_string(&ItemKey::Year)),
            _ => value,
        };
        value.and_then(|value| TagValue::from_stored(key, value))
    }

    fn clear(&mut self, key: TagKey) {
        self.data.remove_key(&Self::tag_key_to_item(key));
        if key == TagKey::Year {
            self.data.remove_key(&ItemKey::Year);
        }
    }

    fn set(&mut self, key: TagKey, value: &TagValue) {
        self.clear(key);
        if !self
            .data
            .insert_text(Self::tag_key_to_item(key), value.to_string())
        {
            log::warn!(
                "Cannot store {key} in {:?} tag, ignoring it",
                self.data.tag_type()
            );
        }
    }

    fn write_to_path(&mut self, path: &Path) -> crate::Result<()> {
        self.data.save_to_path(path, WriteOptions::default())?;
        Ok(())
    }
}
