use crate::cue::error::{CueError, CueErrorKind, CueResult};
use crate::cue::lexer::{Directive, Keyword, tokenize};
use crate::cue::models::{FileEntry, Index, Sheet, Time, Track};
use crate::encoding;
use log::{debug, trace};

pub mod error;
pub mod lexer;
pub mod models;

/// Parses CUE sheets from raw bytes.
///
/// The parser only carries configuration, every call to [`CueParser::parse`]
/// starts from a fresh state.
#[derive(Debug, Clone, Default)]
pub struct CueParser {
    encoding_hint: Option<String>,
}

impl CueParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codepage to decode with when the input is not valid UTF-8.
    pub fn with_encoding_hint(mut self, hint: impl Into<String>) -> Self {
        self.encoding_hint = Some(hint.into());
        self
    }

    pub fn encoding_hint(&self) -> Option<&str> {
        self.encoding_hint.as_deref()
    }

    pub fn parse(&self, data: &[u8]) -> CueResult<Sheet> {
        let decoded = encoding::resolve(data, self.encoding_hint());
        debug!("Decoded CUE sheet as {}", decoded.name());

        self.parse_text(&decoded.text, decoded.name())
    }

    /// Parses text that has already been decoded by the caller.
    pub fn parse_str(&self, text: &str) -> CueResult<Sheet> {
        self.parse_text(text, encoding::UTF_8_NAME.to_string())
    }

    fn parse_text(&self, text: &str, encoding: String) -> CueResult<Sheet> {
        let mut builder = SheetBuilder::new(encoding);

        for directive in tokenize(text) {
            builder.apply(&directive?)?;
        }

        let sheet = builder.finish();
        debug!(
            "Parsed CUE sheet with {} file(s) and {} track(s)",
            sheet.files.len(),
            sheet.tracks().count()
        );

        Ok(sheet)
    }
}

/// Nesting level the next directive is applied at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Disc,
    InFile,
    InTrack,
}

struct SheetBuilder {
    sheet: Sheet,
    state: State,
}

impl SheetBuilder {
    fn new(encoding: String) -> Self {
        Self {
            sheet: Sheet {
                encoding,
                ..Sheet::default()
            },
            state: State::Disc,
        }
    }

    fn finish(self) -> Sheet {
        self.sheet
    }

    fn current_file(&mut self) -> Option<&mut FileEntry> {
        match self.state {
            State::Disc => None,
            State::InFile | State::InTrack => self.sheet.files.last_mut(),
        }
    }

    fn current_track(&mut self) -> Option<&mut Track> {
        match self.state {
            State::Disc | State::InFile => None,
            State::InTrack => self.current_file()?.tracks.last_mut(),
        }
    }

    fn apply(&mut self, directive: &Directive<'_>) -> CueResult<()> {
        trace!("line {}: {}", directive.line, directive.content);
        let argument = &directive.argument;

        match directive.keyword {
            Keyword::Rem => {
                let comment = if argument.quoted && argument.rest.is_empty() {
                    argument.value
                } else {
                    argument.raw
                };
                self.sheet.rem.push(comment.to_string());
            }
            Keyword::Catalog => self.sheet.catalog = Some(required_value(directive)?),
            Keyword::CdTextFile => self.sheet.cd_text_file = Some(required_value(directive)?),
            Keyword::Performer => {
                let value = required_value(directive)?;
                match self.current_track() {
                    Some(track) => track.performer = Some(value),
                    None => self.sheet.performer = Some(value),
                }
            }
            Keyword::Songwriter => {
                let value = required_value(directive)?;
                match self.current_track() {
                    Some(track) => track.song_writer = Some(value),
                    None => self.sheet.song_writer = Some(value),
                }
            }
            Keyword::Title => {
                let value = required_value(directive)?;
                match self.current_track() {
                    Some(track) => track.title = Some(value),
                    None => self.sheet.title = Some(value),
                }
            }
            Keyword::File => {
                let file = parse_file(directive)?;
                self.sheet.files.push(file);
                self.state = State::InFile;
            }
            Keyword::Track => {
                let track = parse_track(directive)?;
                let file = self
                    .current_file()
                    .ok_or_else(|| missing_context(directive, "FILE"))?;
                file.tracks.push(track);
                self.state = State::InTrack;
            }
            Keyword::Index => {
                let mut tokens = argument.tokens();
                let number = parse_number(directive, tokens.next())?;
                let time = parse_time(directive, tokens.next())?;
                self.track_for(directive)?
                    .indexes
                    .push(Index { number, time });
            }
            Keyword::Pregap => {
                let time = parse_time(directive, argument.tokens().next())?;
                self.track_for(directive)?.pregap = Some(time);
            }
            Keyword::Postgap => {
                let time = parse_time(directive, argument.tokens().next())?;
                self.track_for(directive)?.postgap = Some(time);
            }
            Keyword::Flags => {
                let flags = argument.tokens().map(str::to_string).collect();
                self.track_for(directive)?.flags = flags;
            }
            Keyword::Isrc => {
                let isrc = required_value(directive)?;
                self.track_for(directive)?.isrc = Some(isrc);
            }
            Keyword::Unknown => {
                debug!(
                    "Ignoring unknown directive {} on line {}",
                    directive.name, directive.line
                );
            }
        }

        Ok(())
    }

    fn track_for(&mut self, directive: &Directive<'_>) -> CueResult<&mut Track> {
        self.current_track()
            .ok_or_else(|| missing_context(directive, "TRACK"))
    }
}

fn missing_context(directive: &Directive<'_>, required: &'static str) -> CueError {
    directive.error(CueErrorKind::MissingContext {
        keyword: directive.keyword,
        required,
    })
}

fn required_value(directive: &Directive<'_>) -> CueResult<String> {
    if directive.argument.is_empty() {
        return Err(directive.error(CueErrorKind::MissingArgument(directive.keyword)));
    }

    Ok(directive.argument.value.to_string())
}

fn parse_file(directive: &Directive<'_>) -> CueResult<FileEntry> {
    let argument = &directive.argument;
    let (name, file_type) = if argument.quoted {
        (argument.value, argument.rest.split_whitespace().next())
    } else {
        match argument.raw.rsplit_once(char::is_whitespace) {
            Some((name, file_type)) => (name.trim_end(), Some(file_type)),
            None => (argument.raw, None),
        }
    };

    let file_type =
        file_type.ok_or_else(|| directive.error(CueErrorKind::MissingArgument(Keyword::File)))?;

    Ok(FileEntry::new(name, file_type))
}

fn parse_track(directive: &Directive<'_>) -> CueResult<Track> {
    let mut tokens = directive.argument.tokens();
    let number = parse_number(directive, tokens.next())?;
    let track_type = tokens
        .next()
        .ok_or_else(|| directive.error(CueErrorKind::MissingArgument(Keyword::Track)))?;

    Ok(Track::new(number, track_type))
}

fn parse_number(directive: &Directive<'_>, token: Option<&str>) -> CueResult<u64> {
    let token =
        token.ok_or_else(|| directive.error(CueErrorKind::MissingArgument(directive.keyword)))?;

    token
        .parse()
        .map_err(|err| directive.error(CueErrorKind::InvalidNumber(token.to_string(), err)))
}

fn parse_time(directive: &Directive<'_>, token: Option<&str>) -> CueResult<Time> {
    let token =
        token.ok_or_else(|| directive.error(CueErrorKind::MissingArgument(directive.keyword)))?;

    token.parse().map_err(|kind| directive.error(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> CueResult<Sheet> {
        CueParser::new().parse_str(text)
    }

    #[test]
    fn performer_attaches_to_the_active_scope() {
        let sheet = parse(
            "PERFORMER \"Disc\"\nFILE \"a.wav\" WAVE\nPERFORMER \"Still disc\"\n  TRACK 01 AUDIO\n    PERFORMER \"Track\"\n",
        )
        .unwrap();

        assert_eq!(sheet.performer.as_deref(), Some("Still disc"));
        assert_eq!(sheet.files[0].tracks[0].performer.as_deref(), Some("Track"));
    }

    #[test]
    fn last_occurrence_wins() {
        let sheet = parse("TITLE \"First\"\nTITLE \"Second\"").unwrap();
        assert_eq!(sheet.title.as_deref(), Some("Second"));
    }

    #[test]
    fn explicit_empty_string_is_kept() {
        let sheet = parse("TITLE \"\"").unwrap();
        assert_eq!(sheet.title.as_deref(), Some(""));
        assert_eq!(sheet.performer, None);
    }

    #[test]
    fn bare_title_is_missing_argument() {
        let err = parse("TITLE").unwrap_err();
        assert_eq!(err.kind, CueErrorKind::MissingArgument(Keyword::Title));
    }

    #[test]
    fn file_resets_the_current_track() {
        let err = parse("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nFILE \"b.wav\" WAVE\nINDEX 01 00:00:00")
            .unwrap_err();

        assert_eq!(err.line, 4);
        assert_eq!(
            err.kind,
            CueErrorKind::MissingContext {
                keyword: Keyword::Index,
                required: "TRACK",
            }
        );
    }

    #[test]
    fn track_before_file_is_structural_error() {
        let err = parse("TRACK 01 AUDIO").unwrap_err();

        assert_eq!(err.line, 1);
        assert!(err.kind.is_structural());
        assert_eq!(
            err.kind,
            CueErrorKind::MissingContext {
                keyword: Keyword::Track,
                required: "FILE",
            }
        );
    }

    #[test]
    fn unquoted_file_name_keeps_inner_spaces() {
        let sheet = parse("FILE my disc.bin BINARY").unwrap();

        assert_eq!(sheet.files[0].name, "my disc.bin");
        assert_eq!(sheet.files[0].file_type, "BINARY");
    }

    #[test]
    fn file_without_type_fails() {
        let err = parse("FILE \"a.wav\"").unwrap_err();
        assert_eq!(err.kind, CueErrorKind::MissingArgument(Keyword::File));
    }

    #[test]
    fn track_number_is_parsed_as_decimal() {
        let sheet = parse("FILE a.bin BINARY\nTRACK 0010 MODE1/2352").unwrap();
        let track = &sheet.files[0].tracks[0];

        assert_eq!(track.number, 10);
        assert_eq!(track.track_type, "MODE1/2352");
    }

    #[test]
    fn invalid_track_number_fails() {
        let err = parse("FILE a.bin BINARY\nTRACK one AUDIO").unwrap_err();

        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, CueErrorKind::InvalidNumber(ref token, _) if token == "one"));
    }

    #[test]
    fn track_fields_are_collected() {
        let sheet = parse(
            "FILE a.bin BINARY\nTRACK 1 AUDIO\nFLAGS DCP PRE\nISRC ABCDE1234567\nPREGAP 00:02:00\nINDEX 1 00:02:00\nPOSTGAP 00:01:00",
        )
        .unwrap();
        let track = &sheet.files[0].tracks[0];

        assert_eq!(track.flags, vec!["DCP", "PRE"]);
        assert_eq!(track.isrc.as_deref(), Some("ABCDE1234567"));
        assert_eq!(track.pregap, Some(Time::new(0, 2, 0)));
        assert_eq!(track.postgap, Some(Time::new(0, 1, 0)));
        assert_eq!(track.index(1).map(|i| i.time), Some(Time::new(0, 2, 0)));
    }

    #[test]
    fn rem_comments_are_kept_verbatim_in_order() {
        let sheet = parse(
            "REM GENRE \"Pop\"\nREM \"quoted\"\nFILE a.wav WAVE\nTRACK 1 AUDIO\nREM in track",
        )
        .unwrap();

        assert_eq!(sheet.rem, vec!["GENRE \"Pop\"", "quoted", "in track"]);
    }

    #[test]
    fn catalog_inside_track_still_sets_the_sheet() {
        let sheet = parse("FILE a.wav WAVE\nTRACK 1 AUDIO\nCATALOG 0000000000000").unwrap();
        assert_eq!(sheet.catalog.as_deref(), Some("0000000000000"));
    }

    #[test]
    fn parse_str_reports_utf8() {
        let sheet = parse("TITLE x").unwrap();
        assert_eq!(sheet.encoding, "utf-8");
    }
}
