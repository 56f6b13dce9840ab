use crate::cue::error::{CueError, CueErrorKind, CueResult};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Catalog,
    CdTextFile,
    File,
    Flags,
    Index,
    Isrc,
    Performer,
    Postgap,
    Pregap,
    Rem,
    Songwriter,
    Title,
    Track,
    Unknown,
}

impl Keyword {
    pub fn from_token(token: &str) -> Self {
        const KEYWORDS: [(&str, Keyword); 13] = [
            ("CATALOG", Keyword::Catalog),
            ("CDTEXTFILE", Keyword::CdTextFile),
            ("FILE", Keyword::File),
            ("FLAGS", Keyword::Flags),
            ("INDEX", Keyword::Index),
            ("ISRC", Keyword::Isrc),
            ("PERFORMER", Keyword::Performer),
            ("POSTGAP", Keyword::Postgap),
            ("PREGAP", Keyword::Pregap),
            ("REM", Keyword::Rem),
            ("SONGWRITER", Keyword::Songwriter),
            ("TITLE", Keyword::Title),
            ("TRACK", Keyword::Track),
        ];

        KEYWORDS
            .iter()
            .find(|(name, _)| token.eq_ignore_ascii_case(name))
            .map(|(_, keyword)| *keyword)
            .unwrap_or(Keyword::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Catalog => "CATALOG",
            Keyword::CdTextFile => "CDTEXTFILE",
            Keyword::File => "FILE",
            Keyword::Flags => "FLAGS",
            Keyword::Index => "INDEX",
            Keyword::Isrc => "ISRC",
            Keyword::Performer => "PERFORMER",
            Keyword::Postgap => "POSTGAP",
            Keyword::Pregap => "PREGAP",
            Keyword::Rem => "REM",
            Keyword::Songwriter => "SONGWRITER",
            Keyword::Title => "TITLE",
            Keyword::Track => "TRACK",
            Keyword::Unknown => "unknown directive",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The argument string of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argument<'a> {
    /// Everything after the keyword, trimmed.
    pub raw: &'a str,
    /// The quoted string without its quotes, or `raw` if the argument is not quoted.
    pub value: &'a str,
    /// Whatever follows the closing quote, trimmed. Empty for unquoted arguments.
    pub rest: &'a str,
    pub quoted: bool,
}

impl<'a> Argument<'a> {
    fn bare(raw: &'a str) -> Self {
        Self {
            raw,
            value: raw,
            rest: "",
            quoted: false,
        }
    }

    fn parse(raw: &'a str) -> Result<Self, CueErrorKind> {
        let Some(inner) = raw.strip_prefix('"') else {
            return Ok(Self::bare(raw));
        };

        let end = inner.find('"').ok_or(CueErrorKind::UnterminatedQuote)?;

        Ok(Self {
            raw,
            value: &inner[..end],
            rest: inner[end + 1..].trim(),
            quoted: true,
        })
    }

    pub fn is_empty(&self) -> bool {
        !self.quoted && self.raw.is_empty()
    }

    /// Whitespace separated bare tokens of the raw argument string.
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> {
        self.raw.split_whitespace()
    }
}

/// One logical CUE line: a keyword and its argument string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'a> {
    pub line: usize,
    /// The whole trimmed line, kept for error reporting.
    pub content: &'a str,
    pub keyword: Keyword,
    /// The keyword as written in the source.
    pub name: &'a str,
    pub argument: Argument<'a>,
}

impl Directive<'_> {
    pub fn error(&self, kind: CueErrorKind) -> CueError {
        CueError::new(self.line, self.content, kind)
    }
}

/// Splits text into directives, skipping blank lines.
///
/// Lines may end in `\n`, `\r\n` or a lone `\r`.
pub struct Tokenizer<'a> {
    remaining: Option<&'a str>,
    line: usize,
}

pub fn tokenize(text: &str) -> Tokenizer<'_> {
    Tokenizer {
        remaining: Some(text),
        line: 0,
    }
}

impl<'a> Tokenizer<'a> {
    fn next_line(&mut self) -> Option<&'a str> {
        let text = self.remaining?;
        self.line += 1;

        match text.find(['\r', '\n']) {
            Some(pos) => {
                let skip = if text[pos..].starts_with("\r\n") { 2 } else { 1 };
                self.remaining = Some(&text[pos + skip..]);
                Some(&text[..pos])
            }
            None => {
                self.remaining = None;
                Some(text)
            }
        }
    }

    fn directive(&self, content: &'a str) -> CueResult<Directive<'a>> {
        let (name, raw) = content
            .split_once(char::is_whitespace)
            .map(|(name, raw)| (name, raw.trim()))
            .unwrap_or((content, ""));

        let keyword = Keyword::from_token(name);
        let argument = match Argument::parse(raw) {
            Ok(argument) => argument,
            // Vendor directives are never fatal, keep their argument as written.
            Err(_) if keyword == Keyword::Unknown => Argument::bare(raw),
            Err(kind) => return Err(CueError::new(self.line, content, kind)),
        };

        Ok(Directive {
            line: self.line,
            content,
            keyword,
            name,
            argument,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = CueResult<Directive<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let content = self.next_line()?.trim();
            if !content.is_empty() {
                return Some(self.directive(content));
            }
        }
    }
}
