use encoding_rs::{Encoding as RsEncoding, MACINTOSH, SHIFT_JIS, UTF_8, WINDOWS_1252};
use std::borrow::Cow;

pub trait TextDecoder {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str>;

    /// Decode C-style string: stop at the first NUL (0x00).
    fn decode_cstr<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.decode(&bytes[..end])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// PC releases store text resources in the Windows ANSI code page.
    Windows1252,
    /// Macintosh releases.
    MacRoman,
    /// Japanese releases.
    ShiftJis,
}

impl Encoding {
    #[inline]
    pub fn as_encoding_rs(self) -> &'static RsEncoding {
        match self {
            Encoding::Utf8 => UTF_8,
            Encoding::Windows1252 => WINDOWS_1252,
            Encoding::MacRoman => MACINTOSH,
            Encoding::ShiftJis => SHIFT_JIS,
        }
    }
}

/// A simple decoder bound to one encoding.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    enc: Encoding,
}

impl Decoder {
    #[inline]
    pub fn new(enc: Encoding) -> Self {
        Self { enc }
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.enc
    }
}

impl TextDecoder for Decoder {
    fn decode<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self.enc {
            Encoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(s) => Cow::Borrowed(s),
                Err(_) => Cow::Owned(String::from_utf8_lossy(bytes).into_owned()),
            },
            Encoding::Windows1252 | Encoding::MacRoman | Encoding::ShiftJis => {
                let (cow, _had_errors) = self
                    .enc
                    .as_encoding_rs()
                    .decode_without_bom_handling(bytes);
                cow
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Encoding::Windows1252)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_decode_cstr() {
        let d = Decoder::new(Encoding::Utf8);
        assert_eq!(d.decode_cstr(b"hello\0world"), "hello");
    }

    #[test]
    fn windows_1252_high_bytes() {
        let d = Decoder::new(Encoding::Windows1252);
        // 0x93/0x94 are curly quotes, 0xE9 is e-acute
        assert_eq!(d.decode(b"\x93caf\xe9\x94"), "\u{201c}caf\u{e9}\u{201d}");
    }

    #[test]
    fn mac_roman_differs_from_ansi() {
        let d = Decoder::new(Encoding::MacRoman);
        assert_eq!(d.decode(b"\x8e"), "\u{e9}");
    }

    #[test]
    fn default_is_windows_1252() {
        let d = Decoder::default();
        assert_eq!(d.encoding(), Encoding::Windows1252);
        assert_eq!(d.decode_cstr(b"caf\xe9\0junk"), "caf\u{e9}");
    }
}
