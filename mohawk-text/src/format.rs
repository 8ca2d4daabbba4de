use serde::{Deserialize, Serialize};

use crate::error::TextError;

/// Output limit of the legacy formatting buffer, in characters.
pub const DEFAULT_CAPACITY: usize = 4096;

/// One positional argument of a format call.
///
/// Scripts pass plain 16-bit words. A `%s` directive accepts either an
/// inline string or a `(resource, index)` pair of words naming a string
/// inside a text resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatArg {
    Number(u16),
    Text(String),
}

impl From<u16> for FormatArg {
    fn from(value: u16) -> Self {
        FormatArg::Number(value)
    }
}

impl From<i16> for FormatArg {
    fn from(value: i16) -> Self {
        FormatArg::Number(value as u16)
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        FormatArg::Text(value.to_owned())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        FormatArg::Text(value)
    }
}

/// Lookup of strings stored in text resources.
pub trait TextSource {
    fn lookup_text(&self, resource: u16, index: u16) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub capacity: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Literal,
    Directive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    None,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    fill: char,
    align: Align,
    width: usize,
}

impl FieldSpec {
    /// Reads the optional `0`, `=`, `-` and width digits that sit between
    /// the `%` and the conversion character.
    fn parse(chars: &[char], pos: &mut usize) -> Self {
        let mut fill = ' ';
        let mut align = Align::None;
        let mut prefixed = true;

        match chars.get(*pos) {
            Some('0') => {
                fill = '0';
                *pos += 1;
            }
            Some('=') => {
                align = Align::Center;
                *pos += 1;
            }
            _ => prefixed = false,
        }

        let width = parse_width(chars, pos, prefixed);
        let align = if width < 0 {
            Align::Left
        } else if width > 0 && align == Align::None {
            Align::Right
        } else {
            align
        };

        Self {
            fill,
            align,
            width: width.unsigned_abs() as usize,
        }
    }

    fn padding(&self, body_len: usize) -> (usize, usize) {
        let pad = self.width.saturating_sub(body_len);
        match self.align {
            Align::None | Align::Right => (pad, 0),
            Align::Left => (0, pad),
            Align::Center => (pad / 2, pad - pad / 2),
        }
    }
}

/// Signed decimal width. A bare width is only `-` or digits; after a `0` or
/// `=` prefix the read is `strtol`-like (leading whitespace, `+` or `-`).
/// Leaves `pos` untouched when no digit follows the optional sign.
fn parse_width(chars: &[char], pos: &mut usize, lenient: bool) -> i32 {
    let start = *pos;
    let mut cur = start;
    if lenient {
        while chars
            .get(cur)
            .is_some_and(|&c| matches!(c, ' ' | '\t'..='\r'))
        {
            cur += 1;
        }
    }
    let negative = match chars.get(cur) {
        Some('-') => {
            cur += 1;
            true
        }
        Some('+') if lenient => {
            cur += 1;
            false
        }
        _ => false,
    };

    let mut value: i32 = 0;
    let mut digits = 0;
    while let Some(d) = chars.get(cur).and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(d as i32);
        digits += 1;
        cur += 1;
    }

    if digits == 0 {
        *pos = start;
        return 0;
    }
    *pos = cur;
    if negative {
        -value
    } else {
        value
    }
}

struct Output {
    text: String,
    written: usize,
    capacity: usize,
}

impl Output {
    fn new(capacity: usize) -> Self {
        Self {
            text: String::new(),
            written: 0,
            capacity,
        }
    }

    fn push(&mut self, ch: char) -> Result<(), TextError> {
        if self.written >= self.capacity {
            return Err(TextError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.text.push(ch);
        self.written += 1;
        Ok(())
    }

    fn push_str(&mut self, s: &str) -> Result<(), TextError> {
        s.chars().try_for_each(|ch| self.push(ch))
    }

    fn repeat(&mut self, ch: char, count: usize) -> Result<(), TextError> {
        (0..count).try_for_each(|_| self.push(ch))
    }

    /// Writes `body` padded to the field width. Leading padding uses
    /// `fill`, trailing padding is always blank.
    fn padded(&mut self, body: &str, spec: &FieldSpec, fill: char) -> Result<(), TextError> {
        let (before, after) = spec.padding(body.chars().count());
        self.repeat(fill, before)?;
        self.push_str(body)?;
        self.repeat(' ', after)
    }
}

/// Printf-like formatter for script text.
///
/// Supports `%%`, `%s`, `%c`, `%d`, `%u` and `%x` with an optional field
/// spec: `0` for zero fill, `=` for centering, `-` for left alignment and a
/// decimal width. Unknown conversions are copied through as `%<char>`.
pub struct Formatter<'a> {
    texts: Option<&'a dyn TextSource>,
    options: FormatOptions,
}

impl<'a> Formatter<'a> {
    pub fn new(options: FormatOptions) -> Self {
        Self {
            texts: None,
            options,
        }
    }

    pub fn with_texts(mut self, texts: &'a dyn TextSource) -> Self {
        self.texts = Some(texts);
        self
    }

    pub fn options(&self) -> FormatOptions {
        self.options
    }

    pub fn format(&self, template: &str, args: &[FormatArg]) -> Result<String, TextError> {
        let chars: Vec<char> = template.chars().collect();
        let mut out = Output::new(self.options.capacity);
        let mut mode = Mode::Literal;
        let mut cursor = 0usize;
        let mut pos = 0usize;

        while pos < chars.len() {
            let ch = chars[pos];
            match mode {
                Mode::Literal => {
                    pos += 1;
                    if ch == '%' {
                        mode = Mode::Directive;
                    } else {
                        out.push(ch)?;
                    }
                }
                Mode::Directive => {
                    mode = Mode::Literal;
                    if ch == '%' {
                        pos += 1;
                        out.push('%')?;
                        continue;
                    }

                    let spec = FieldSpec::parse(&chars, &mut pos);
                    let Some(&conversion) = chars.get(pos) else {
                        out.push('%')?;
                        break;
                    };
                    pos += 1;

                    match conversion {
                        's' => {
                            let (text, used) = self.string_arg(args, cursor)?;
                            cursor += used;
                            out.padded(&text, &spec, ' ')?;
                        }
                        'c' => {
                            let value = number_arg(args, cursor)?;
                            cursor += 1;
                            let byte = (value & 0xFF) as u8;
                            let (before, after) = spec.padding(1);
                            out.repeat(' ', before)?;
                            if byte != 0 {
                                out.push(char::from(byte))?;
                            }
                            out.repeat(' ', after)?;
                        }
                        'd' | 'u' | 'x' => {
                            let value = number_arg(args, cursor)?;
                            cursor += 1;
                            let body = match conversion {
                                'd' => (value as i16).to_string(),
                                'u' => value.to_string(),
                                _ => format!("{value:x}"),
                            };
                            out.padded(&body, &spec, spec.fill)?;
                        }
                        other => {
                            log::trace!("format: passing through unknown conversion %{other}");
                            out.push('%')?;
                            out.push(other)?;
                        }
                    }
                }
            }
        }

        Ok(out.text)
    }

    fn string_arg(&self, args: &[FormatArg], cursor: usize) -> Result<(String, usize), TextError> {
        match args.get(cursor) {
            None => Err(TextError::MissingArgument { index: cursor }),
            Some(FormatArg::Text(text)) => Ok((text.clone(), 1)),
            Some(FormatArg::Number(resource)) => {
                let index = number_arg(args, cursor + 1)?;
                let text = self
                    .texts
                    .and_then(|texts| texts.lookup_text(*resource, index))
                    .ok_or(TextError::MissingText {
                        resource: *resource,
                        index,
                    })?;
                Ok((text, 2))
            }
        }
    }
}

impl Default for Formatter<'_> {
    fn default() -> Self {
        Self::new(FormatOptions::default())
    }
}

fn number_arg(args: &[FormatArg], index: usize) -> Result<u16, TextError> {
    match args.get(index) {
        Some(FormatArg::Number(value)) => Ok(*value),
        Some(FormatArg::Text(_)) => Err(TextError::NotANumber { index }),
        None => Err(TextError::MissingArgument { index }),
    }
}

/// Formats with the default capacity and no text resources.
pub fn format(template: &str, args: &[FormatArg]) -> Result<String, TextError> {
    Formatter::default().format(template, args)
}
