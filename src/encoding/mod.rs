use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, warn};
use std::borrow::Cow;

pub const UTF_8_NAME: &str = "utf-8";

const UTF_8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text decoded from a CUE sheet together with the codepage it was decoded with.
#[derive(Debug, Clone)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
}

impl Decoded<'_> {
    /// Lowercase name of the codepage actually used, e.g. `windows-1252`.
    pub fn name(&self) -> String {
        self.encoding.name().to_ascii_lowercase()
    }
}

/// Returns `true` if `data` is well formed UTF-8, ignoring a leading byte order mark.
pub fn is_utf8(data: &[u8]) -> bool {
    let data = data.strip_prefix(UTF_8_BOM).unwrap_or(data);
    Encoding::utf8_valid_up_to(data) == data.len()
}

/// Maps a caller supplied label to the codepage that decodes it.
///
/// Labels are resolved with the WHATWG rules, so single byte codepages that are
/// subsets of a richer one resolve to the superset (`iso-8859-1` gives
/// `windows-1252`). Labels of multi-byte encodings, or of anything that is not a
/// single byte codepage, fall back to windows-1252, which is also used when no
/// hint is given.
pub fn codepage_for_hint(hint: Option<&str>) -> &'static Encoding {
    let Some(label) = hint else {
        return WINDOWS_1252;
    };

    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) if encoding.is_single_byte() => encoding,
        Some(encoding) => {
            debug!(
                "{} is not a single byte codepage, falling back to {}",
                encoding.name(),
                WINDOWS_1252.name()
            );
            WINDOWS_1252
        }
        None => {
            warn!(
                "Unknown encoding {:?}, falling back to {}",
                label,
                WINDOWS_1252.name()
            );
            WINDOWS_1252
        }
    }
}

/// Decodes `data` with the codepage selected by `hint`. Never fails, bytes
/// without a mapping are replaced with U+FFFD.
pub fn decode_codepage<'a>(data: &'a [u8], hint: Option<&str>) -> Decoded<'a> {
    let encoding = codepage_for_hint(hint);
    let (text, had_errors) = encoding.decode_without_bom_handling(data);
    if had_errors {
        debug!("Replaced malformed sequences while decoding as {}", encoding.name());
    }

    Decoded { text, encoding }
}

/// Decodes a CUE sheet.
///
/// Valid UTF-8 always wins over the hint. A UTF-16 byte order mark selects the
/// matching UTF-16 decoder. Anything else, including a UTF-8 byte order mark
/// followed by invalid UTF-8, goes through [`decode_codepage`] with the mark
/// stripped.
pub fn resolve<'a>(data: &'a [u8], hint: Option<&str>) -> Decoded<'a> {
    if is_utf8(data) {
        let (text, _) = UTF_8.decode_with_bom_removal(data);
        return Decoded {
            text,
            encoding: UTF_8,
        };
    }

    match Encoding::for_bom(data) {
        Some((encoding, bom_length)) if encoding != UTF_8 => {
            let (text, _) = encoding.decode_without_bom_handling(&data[bom_length..]);
            Decoded { text, encoding }
        }
        Some((_, bom_length)) => decode_codepage(&data[bom_length..], hint),
        None => decode_codepage(data, hint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_wins_over_hint() {
        let data = "TITLE \"Café\"".as_bytes();
        let decoded = resolve(data, Some("iso-8859-1"));

        assert_eq!(decoded.name(), "utf-8");
        assert_eq!(decoded.text, "TITLE \"Café\"");
    }

    #[test]
    fn latin1_hint_resolves_to_windows_1252() {
        let data = b"TITLE \"Caf\xE9 \x80\"";
        let decoded = resolve(data, Some("iso-8859-1"));

        assert_eq!(decoded.name(), "windows-1252");
        assert_eq!(decoded.text, "TITLE \"Café €\"");
    }

    #[test]
    fn missing_or_unknown_hint_defaults_to_windows_1252() {
        let data = b"Luc\xEDa";

        assert_eq!(resolve(data, None).name(), "windows-1252");
        assert_eq!(resolve(data, Some("not-a-codepage")).text, "Lucía");
        assert_eq!(resolve(data, Some("utf-8")).name(), "windows-1252");
    }

    #[test]
    fn other_codepages_are_honoured() {
        // "Привет" in windows-1251
        let data = b"\xCF\xF0\xE8\xE2\xE5\xF2";
        let decoded = decode_codepage(data, Some("cp1251"));

        assert_eq!(decoded.name(), "windows-1251");
        assert_eq!(decoded.text, "Привет");
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let data = b"\xEF\xBB\xBFTITLE x";

        assert!(is_utf8(data));
        assert_eq!(resolve(data, None).text, "TITLE x");
    }

    #[test]
    fn utf8_bom_with_latin1_body_uses_hint() {
        let data = b"\xEF\xBB\xBFPERFORMER \"Paco de Luc\xEDa\"";
        let decoded = resolve(data, Some("iso-8859-1"));

        assert_eq!(decoded.name(), "windows-1252");
        assert_eq!(decoded.text, "PERFORMER \"Paco de Lucía\"");
    }

    #[test]
    fn multi_byte_hints_fall_back_to_windows_1252() {
        let data = b"Luc\xEDa";

        assert_eq!(codepage_for_hint(Some("shift_jis")), WINDOWS_1252);
        assert_eq!(codepage_for_hint(Some("utf-16le")), WINDOWS_1252);
        assert_eq!(resolve(data, Some("shift_jis")).text, "Lucía");
        assert_eq!(codepage_for_hint(Some("koi8-r")).name(), "KOI8-R");
    }

    #[test]
    fn utf16_bom_selects_utf16() {
        let data = b"\xFF\xFET\0I\0";
        let decoded = resolve(data, Some("iso-8859-1"));

        assert_eq!(decoded.name(), "utf-16le");
        assert_eq!(decoded.text, "TI");
    }

    #[test]
    fn is_utf8_rejects_overlong_and_stray_continuations() {
        assert!(!is_utf8(b"\xC0\xAF"));
        assert!(!is_utf8(b"abc\x80"));
        assert!(is_utf8("ü".as_bytes()));
        assert!(is_utf8(b""));
    }
}
