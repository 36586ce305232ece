// Copyright (c) 2024 Jan Holthuis <jan.holthuis@rub.de>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Command line interface.

use crate::edit::{self, EditRequest, TitleParser};
use crate::manifest::Manifest;
use crate::tag::{TagKey, TagValue};
use crate::{Config, Error};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

/// Tag values given on the command line.
#[derive(clap::Args, Debug, Default)]
struct TagArgs {
    /// Title of the release.
    #[arg(long)]
    album: Option<String>,
    /// Artist(s) primarily credited on the release.
    #[arg(long)]
    albumartist: Option<String>,
    /// Track artist.
    #[arg(long)]
    artist: Option<String>,
    /// Comment.
    #[arg(long)]
    comment: Option<String>,
    /// 1 for Various Artist albums, otherwise 0.
    #[arg(long)]
    compilation: Option<u32>,
    /// Composer.
    #[arg(long)]
    composer: Option<String>,
    /// Disc number.
    #[arg(long)]
    discnumber: Option<u32>,
    /// Genre.
    #[arg(long)]
    genre: Option<String>,
    /// International Standard Recording Code.
    #[arg(long)]
    isrc: Option<String>,
    /// Lyrics.
    #[arg(long)]
    lyrics: Option<String>,
    /// Total number of discs.
    #[arg(long)]
    totaldiscs: Option<u32>,
    /// Total number of tracks.
    #[arg(long)]
    totaltracks: Option<u32>,
    /// Track number.
    #[arg(long)]
    tracknumber: Option<u32>,
    /// Track title.
    #[arg(long)]
    tracktitle: Option<String>,
    /// Release year.
    #[arg(long)]
    year: Option<u32>,
}

impl TagArgs {
    /// Collect the tag values that were given.
    fn into_values(self) -> BTreeMap<TagKey, TagValue> {
        let texts = [
            (TagKey::Album, self.album),
            (TagKey::AlbumArtist, self.albumartist),
            (TagKey::Artist, self.artist),
            (TagKey::Comment, self.comment),
            (TagKey::Composer, self.composer),
            (TagKey::Genre, self.genre),
            (TagKey::Isrc, self.isrc),
            (TagKey::Lyrics, self.lyrics),
            (TagKey::TrackTitle, self.tracktitle),
        ];
        let numbers = [
            (TagKey::Compilation, self.compilation),
            (TagKey::DiscNumber, self.discnumber),
            (TagKey::TotalDiscs, self.totaldiscs),
            (TagKey::TotalTracks, self.totaltracks),
            (TagKey::TrackNumber, self.tracknumber),
            (TagKey::Year, self.year),
        ];

        texts
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, TagValue::Text(value))))
            .chain(
                numbers
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|value| (key, TagValue::Number(value)))),
            )
            .collect()
    }
}

/// Patterns for deriving tags from file names.
#[derive(clap::Args, Debug, Default)]
struct ParserArgs {
    /// Parse the track title from the file name and capitalize it as a title.
    ///
    /// Takes a regular expression, e.g. `(?<=\d\d\s).+(?=\.flac)`.
    #[arg(long, value_name = "PATTERN")]
    parse_title_capitalize: Option<String>,
    /// Parse the track title from the file name and leave it as is.
    ///
    /// Takes a regular expression, e.g. `(?<=\d\d\s).+(?=\.flac)`.
    #[arg(long, value_name = "PATTERN")]
    parse_title_as_is: Option<String>,
    /// Parse the track title from the file name, replace '-', '_' and repeated whitespace with a
    /// single space, and capitalize it as a title.
    ///
    /// Takes a regular expression, e.g. `(?<=\d\d\s).+(?=\.flac)`. The expression is applied
    /// after the replacement, so it cannot match '-' or '_'.
    #[arg(long, value_name = "PATTERN")]
    parse_title_clean: Option<String>,
    /// Parse the track number from the file name.
    ///
    /// Takes a regular expression, e.g. `\d+(?=.+\.mp3)`. Files without a match get track
    /// number 0.
    #[arg(long, value_name = "PATTERN")]
    parse_track_number: Option<String>,
}

impl ParserArgs {
    /// Collect the title patterns that were given.
    fn title_patterns(&self) -> BTreeMap<TitleParser, String> {
        [
            (TitleParser::Capitalize, &self.parse_title_capitalize),
            (TitleParser::AsIs, &self.parse_title_as_is),
            (TitleParser::Clean, &self.parse_title_clean),
        ]
        .into_iter()
        .filter_map(|(parser, pattern)| pattern.clone().map(|pattern| (parser, pattern)))
        .collect()
    }
}

/// Command line Arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Audio file to tag.
    #[arg(long)]
    file: Option<PathBuf>,
    /// Directory with audio files to tag (overrides --file).
    #[arg(long)]
    files_directory: Option<PathBuf>,
    /// Text file with `key=value` lines (overrides --file, --files-directory and other options
    /// it contains).
    #[arg(long, value_name = "MANIFEST")]
    from_file: Option<PathBuf>,
    /// Also tag files in subdirectories of --files-directory.
    #[arg(short, long)]
    recursive: bool,
    /// Tag values.
    #[command(flatten)]
    tags: TagArgs,
    /// Title and track number parsers.
    #[command(flatten)]
    parsers: ParserArgs,
    /// Show debug information.
    #[arg(short, long)]
    verbose: bool,
    /// Path to configuration file.
    #[arg(short, long, required = false)]
    config_path: Option<PathBuf>,
}

impl Args {
    /// Get the desired log level, depending on the verbose flag passed on the command line.
    fn log_level_filter(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Get the current configuration.
    fn config(&self) -> crate::Result<Config> {
        let path = self
            .config_path
            .clone()
            .or_else(Config::find_user_config_path);
        let mut config = match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Config::load_from_path(path).map(|config| config.with_defaults())?
            }
            None => Config::default(),
        };
        if self.recursive {
            config.files.recursive = Some(true);
        }
        Ok(config)
    }

    /// Build the edit request, applying the manifest if one was given.
    fn into_edit_request(self) -> crate::Result<EditRequest> {
        let manifest = self
            .from_file
            .as_ref()
            .map(Manifest::read_from_path)
            .transpose()?;

        let mut request = EditRequest {
            title_patterns: self.parsers.title_patterns(),
            track_number_pattern: self.parsers.parse_track_number,
            file: self.file,
            files_directory: self.files_directory,
            tags: self.tags.into_values(),
        };
        if let Some(manifest) = manifest {
            request.merge_manifest(manifest);
        }
        Ok(request)
    }
}

/// Parse the arguments and run the edit.
fn run(args: Args) -> crate::Result<()> {
    let config = args.config()?;
    let request = args.into_edit_request()?;
    let paths = edit::run(&config, &request)?;
    log::info!("Tagged {} files", paths.len());
    Ok(())
}

/// Log the error and all of its sources.
fn report_error(err: &Error) {
    log::error!("{err}");
    let mut source = std::error::Error::source(err);
    while let Some(err) = source {
        log::error!("Caused by: {err}");
        source = std::error::Error::source(err);
    }
}

/// Main entry point.
///
/// Returns a successful exit code if the files were tagged or if there was nothing to do, and a
/// failure exit code otherwise.
#[must_use]
pub fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = TermLogger::init(
        args.log_level_filter(),
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {err}");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_expected_termination() => {
            log::info!("{err} Nothing to do.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_command() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_tags() {
        let args = Args::try_parse_from([
            "audiometa",
            "--file",
            "01 gloomy sky.mp3",
            "--artist",
            "Mogwai",
            "--year",
            "1997",
            "--tracknumber",
            "1",
        ])
        .unwrap();
        let request = args.into_edit_request().unwrap();
        assert_eq!(request.file, Some(PathBuf::from("01 gloomy sky.mp3")));
        assert_eq!(
            request.tags,
            BTreeMap::from([
                (TagKey::Artist, TagValue::from("Mogwai")),
                (TagKey::TrackNumber, TagValue::Number(1)),
                (TagKey::Year, TagValue::Number(1997)),
            ])
        );
        assert!(request.title_patterns.is_empty());
    }

    #[test]
    fn test_integer_tag_rejects_text() {
        let result = Args::try_parse_from(["audiometa", "--year", "nineteen"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_parsers() {
        let args = Args::try_parse_from([
            "audiometa",
            "--files-directory",
            "album",
            "--parse-title-clean",
            r"(?<=\d\d\s).+(?=\.flac)",
            "--parse-title-as-is",
            ".+",
            "--parse-track-number",
            r"\d+",
            "-r",
        ])
        .unwrap();
        assert!(args.recursive);
        let request = args.into_edit_request().unwrap();
        assert_eq!(
            request.title_patterns.keys().copied().collect::<Vec<_>>(),
            [TitleParser::AsIs, TitleParser::Clean]
        );
        assert_eq!(request.track_number_pattern.as_deref(), Some(r"\d+"));
    }

    #[test]
    fn test_blank_parser_arguments() {
        let args = Args::try_parse_from([
            "audiometa",
            "--file",
            "01 gloomy sky.mp3",
            "--parse-title-as-is",
            "",
            "--parse-track-number",
            " ",
        ])
        .unwrap();
        let request = args.into_edit_request().unwrap();
        assert!(!request.has_changes());
    }

    #[test]
    fn test_manifest_overrides_arguments() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        writeln!(manifest, "files-directory=other").unwrap();
        writeln!(manifest, "genre=Post-Rock").unwrap();

        let args = Args::try_parse_from([
            "audiometa",
            "--files-directory",
            "album",
            "--genre",
            "Rock",
            "--album",
            "Young Team",
            "--from-file",
            manifest.path().to_str().unwrap(),
        ])
        .unwrap();
        let request = args.into_edit_request().unwrap();
        assert_eq!(request.files_directory, Some(PathBuf::from("other")));
        assert_eq!(
            request.tags.get(&TagKey::Genre),
            Some(&TagValue::from("Post-Rock"))
        );
        assert_eq!(
            request.tags.get(&TagKey::Album),
            Some(&TagValue::from("Young Team"))
        );
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tags.txt");
        let args =
            Args::try_parse_from(["audiometa", "--from-file", path.to_str().unwrap()]).unwrap();
        assert!(matches!(
            args.into_edit_request(),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_binary_manifest() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        manifest.write_all(&[0xFF, 0xFB, 0x90, 0x00, 0x00]).unwrap();
        let args = Args::try_parse_from([
            "audiometa",
            "--from-file",
            manifest.path().to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(
            args.into_edit_request(),
            Err(Error::NotATextFile(_))
        ));
    }

    #[test]
    fn test_config_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[id3]\nversion = \"2.3\"").unwrap();
        let args = Args::try_parse_from([
            "audiometa",
            "--config-path",
            file.path().to_str().unwrap(),
            "--recursive",
        ])
        .unwrap();
        let config = args.config().unwrap();
        assert!(config.recursive());
        assert_eq!(config.extensions().len(), 10);
    }
}
