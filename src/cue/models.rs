// src/cue/models
use crate::cd::{FRAMES_PER_MINUTE, FRAMES_PER_SECOND, LEAD_IN_FRAMES, SECONDS_PER_MINUTE};
use crate::cue::error::CueErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// A fully parsed CUE sheet.
///
/// The sheet owns every file, track and index below it; there are no
/// back-references from children to their parents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub catalog: Option<String>,
    pub cd_text_file: Option<String>,
    pub performer: Option<String>,
    pub song_writer: Option<String>,
    pub title: Option<String>,
    /// Every REM comment of the sheet, in the order they were encountered.
    pub rem: Vec<String>,
    /// Name of the codepage the input was decoded with, e.g. `utf-8`.
    pub encoding: String,
    pub files: Vec<FileEntry>,
}

impl Sheet {
    /// Iterates over the tracks of every file in directive order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.files.iter().flat_map(|file| file.tracks.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub tracks: Vec<Track>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: file_type.into(),
            tracks: Vec::new(),
        }
    }

    /// Returns the file type if it is one of the types defined by the CUE format.
    pub fn file_type(&self) -> Option<FileType> {
        self.file_type.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub number: u64,
    #[serde(rename = "type")]
    pub track_type: String,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub song_writer: Option<String>,
    pub isrc: Option<String>,
    pub flags: Vec<String>,
    pub pregap: Option<Time>,
    pub postgap: Option<Time>,
    pub indexes: Vec<Index>,
}

impl Track {
    pub fn new(number: u64, track_type: impl Into<String>) -> Self {
        Self {
            number,
            track_type: track_type.into(),
            title: None,
            performer: None,
            song_writer: None,
            isrc: None,
            flags: Vec::new(),
            pregap: None,
            postgap: None,
            indexes: Vec::new(),
        }
    }

    pub fn track_type(&self) -> Option<TrackType> {
        self.track_type.parse().ok()
    }

    /// The flags of this track that are known sub-channel flags, unknown ones are skipped.
    pub fn typed_flags(&self) -> Vec<TrackFlag> {
        self.flags.iter().filter_map(|flag| flag.parse().ok()).collect()
    }

    /// Returns the first index with the given number.
    pub fn index(&self, number: u64) -> Option<&Index> {
        self.indexes.iter().find(|index| index.number == number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub number: u64,
    pub time: Time,
}

/// A literal `mm:ss:ff` position. The components are not range checked,
/// some rippers write absolute frame offsets with minutes above 99.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Time {
    pub min: u64,
    pub sec: u64,
    pub frame: u64,
}

impl Time {
    pub const fn new(min: u64, sec: u64, frame: u64) -> Self {
        Self { min, sec, frame }
    }

    pub fn from_frames(frames: u64) -> Self {
        Self {
            min: frames / FRAMES_PER_MINUTE,
            sec: (frames % FRAMES_PER_MINUTE) / FRAMES_PER_SECOND,
            frame: frames % FRAMES_PER_SECOND,
        }
    }

    /// Absolute number of frames this position describes, saturating at `u64::MAX`.
    pub fn to_frames(&self) -> u64 {
        self.min
            .saturating_mul(SECONDS_PER_MINUTE)
            .saturating_add(self.sec)
            .saturating_mul(FRAMES_PER_SECOND)
            .saturating_add(self.frame)
    }

    /// Logical block address, `None` for positions inside the lead-in.
    pub fn to_lba(&self) -> Option<u64> {
        self.to_frames().checked_sub(LEAD_IN_FRAMES)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.min, self.sec, self.frame)
    }
}

impl FromStr for Time {
    type Err = CueErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(CueErrorKind::InvalidMsfFormat(s.to_string()));
        }

        let component = |part: &str| {
            part.parse::<u64>().map_err(|err| {
                if matches!(err.kind(), IntErrorKind::PosOverflow) {
                    CueErrorKind::InvalidNumber(part.to_string(), err)
                } else {
                    CueErrorKind::InvalidMsfFormat(s.to_string())
                }
            })
        };

        Ok(Time {
            min: component(parts[0])?,
            sec: component(parts[1])?,
            frame: component(parts[2])?,
        })
    }
}

macro_rules! known_values {
    ( $name:ident { $( $variant:ident => $value:literal ),+ $(,)? } ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $value, )+
                }
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($value) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

known_values!(FileType {
    Binary => "BINARY",
    Motorola => "MOTOROLA",
    Aiff => "AIFF",
    Wave => "WAVE",
    Mp3 => "MP3",
});

known_values!(TrackType {
    Audio => "AUDIO",
    CdG => "CDG",
    Mode1_2048 => "MODE1/2048",
    Mode1_2352 => "MODE1/2352",
    Mode2_2336 => "MODE2/2336",
    Mode2_2352 => "MODE2/2352",
    CdI2336 => "CDI/2336",
    CdI2352 => "CDI/2352",
});

known_values!(TrackFlag {
    DigitalCopyPermitted => "DCP",
    FourChannel => "4CH",
    PreEmphasis => "PRE",
    SerialCopyManagement => "SCMS",
});
