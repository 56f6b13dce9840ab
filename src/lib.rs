//! Parser for CUE sheets.
//!
//! Takes the raw bytes of a `.cue` file, decodes them (UTF-8, or a legacy
//! codepage picked from a hint) and builds a [`Sheet`] describing the disc,
//! the files it references and the tracks and indexes inside each file.
//!
//! ```
//! let data = b"TITLE \"Album\"\nFILE \"a.wav\" WAVE\n  TRACK 01 AUDIO\n    INDEX 01 00:00:00\n";
//! let sheet = cue_parser::parse(data, Some("utf-8"))?;
//!
//! assert_eq!(sheet.title.as_deref(), Some("Album"));
//! assert_eq!(sheet.files[0].tracks[0].indexes[0].time.frame, 0);
//! # Ok::<(), cue_parser::CueError>(())
//! ```

pub mod cd;
pub mod cue;
pub mod encoding;

pub use cue::CueParser;
pub use cue::error::{CueError, CueErrorKind, CueResult};
pub use cue::models::{FileEntry, FileType, Index, Sheet, Time, Track, TrackFlag, TrackType};

/// Parses a CUE sheet, decoding it with `encoding_hint` if it is not valid UTF-8.
pub fn parse(data: &[u8], encoding_hint: Option<&str>) -> CueResult<Sheet> {
    let parser = match encoding_hint {
        Some(hint) => CueParser::new().with_encoding_hint(hint),
        None => CueParser::new(),
    };

    parser.parse(data)
}
