use serde::{Deserialize, Serialize};

use crate::markup::{Markup, Token};

/// Per-font glyph metrics supplied by the renderer.
pub trait FontMetrics {
    fn char_width(&self, font: u16, ch: char) -> i32;
    fn line_height(&self, font: u16) -> i32;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Maps the numeric codes used by `|a<n>|` markup. Unknown codes fall
    /// back to left alignment.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Alignment::Center,
            2 => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

/// Mutable drawing state of one layout pass. Inline markup updates it from
/// the character where the directive appears.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStyle {
    pub font: u16,
    pub fore_color: u16,
    pub back_color: Option<u16>,
    pub border_color: Option<u16>,
    pub alignment: Alignment,
    pub dimmed: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl TextRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSize {
    pub width: i32,
    pub height: i32,
}

/// A single positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlyphDraw {
    pub ch: char,
    pub x: i32,
    pub y: i32,
    pub font: u16,
    pub color: u16,
    pub dimmed: bool,
}

/// Result of fitting one line: the visible run is `length` characters from
/// the line start and the next line begins at `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineFit {
    pub next: usize,
    pub length: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TextLayout {
    pub bounds: TextRect,
    pub background: Option<u16>,
    pub border: Option<u16>,
    pub lines: Vec<LineFit>,
    /// Indices into `lines` of the lines that were forced to one character
    /// because nothing fit in the box width.
    pub forced_lines: Vec<usize>,
    pub glyphs: Vec<GlyphDraw>,
}

fn is_line_break(ch: char) -> bool {
    ch == '\r' || ch == '\n'
}

/// Greedy word-wrapping layout over a piece of text.
pub struct TextLayouter<'a> {
    fonts: &'a dyn FontMetrics,
    text: Vec<char>,
}

impl<'a> TextLayouter<'a> {
    pub fn new(fonts: &'a dyn FontMetrics, text: &str) -> Self {
        Self {
            fonts,
            text: text.chars().collect(),
        }
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    fn run(&self, start: usize, len: usize) -> &[char] {
        let start = start.min(self.text.len());
        let end = start.saturating_add(len).min(self.text.len());
        &self.text[start..end]
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.text.get(index).copied()
    }

    /// Pixel width of `len` raw characters from `start`. Markup inside the
    /// run is honored but `style` itself is left untouched.
    pub fn measure_width(&self, style: &LayoutStyle, start: usize, len: usize) -> i32 {
        let mut font = style.font;
        let mut width = 0;
        for token in Markup::new(self.run(start, len)) {
            match token {
                Token::Glyph(ch) => width += self.fonts.char_width(font, ch),
                Token::Font(f) => font = f,
                Token::Align(_) | Token::Color(_) => {}
            }
        }
        width
    }

    /// Finds how much text from `start` fits in `max_width`.
    ///
    /// Breaks at the last space that keeps the line within the width and
    /// folds the spaces after it into the break. An explicit `\r`, `\n`,
    /// `\r\n` or `\n\r` ends the line. A first word that is wider than the
    /// whole line is split where it overflows.
    pub fn longest_fit(&self, style: &LayoutStyle, start: usize, max_width: i32) -> LineFit {
        let mut index = start;
        let mut test_len = 0usize;
        let mut length = 0usize;
        let mut last_break = start;

        while let Some(ch) = self.char_at(index) {
            if is_line_break(ch) {
                let next = self.char_at(index + 1);
                let paired = (ch == '\r' && next == Some('\n'))
                    || (ch == '\n'
                        && next == Some('\r')
                        && self.char_at(index + 2) != Some('\n'));
                if paired {
                    index += 1;
                }
                if length > 0 && self.measure_width(style, start, test_len) > max_width {
                    return LineFit {
                        next: last_break,
                        length,
                    };
                }
                return LineFit {
                    next: index + 1,
                    length: test_len,
                };
            }

            if ch == ' ' {
                if self.measure_width(style, start, test_len) > max_width {
                    let mut next = last_break;
                    while self.char_at(next) == Some(' ') {
                        next += 1;
                    }
                    return LineFit { next, length };
                }
                length = test_len;
                last_break = index + 1;
            }

            index += 1;
            test_len += 1;

            if length == 0 && self.measure_width(style, start, test_len) > max_width {
                test_len -= 1;
                return LineFit {
                    next: last_break + test_len,
                    length: test_len,
                };
            }
        }

        if length == 0 || self.measure_width(style, start, test_len) <= max_width {
            LineFit {
                next: index,
                length: test_len,
            }
        } else {
            LineFit {
                next: last_break,
                length,
            }
        }
    }

    /// Like `longest_fit`, but never stalls: when nothing fits the line is
    /// forced to a single character and the second value is `true`.
    fn fit_line(&self, style: &LayoutStyle, start: usize, max_width: i32) -> (LineFit, bool) {
        let fit = self.longest_fit(style, start, max_width);
        if fit.next > start {
            return (fit, false);
        }
        log::warn!(
            "text layout: nothing fits in {max_width} pixels at character {start}, forcing one"
        );
        let forced = LineFit {
            next: start + 1,
            length: 1,
        };
        (forced, true)
    }

    /// Emits `len` characters from `start` as glyphs at `(x, y)`, applying
    /// markup to `style` as it goes. Returns the pen position after the run.
    pub fn draw_run(
        &self,
        style: &mut LayoutStyle,
        start: usize,
        len: usize,
        mut x: i32,
        y: i32,
        out: &mut Vec<GlyphDraw>,
    ) -> i32 {
        for token in Markup::new(self.run(start, len)) {
            match token {
                Token::Glyph(ch) => {
                    out.push(GlyphDraw {
                        ch,
                        x,
                        y,
                        font: style.font,
                        color: style.fore_color,
                        dimmed: style.dimmed,
                    });
                    x += self.fonts.char_width(style.font, ch);
                }
                Token::Align(code) => style.alignment = Alignment::from_code(code),
                Token::Color(color) => style.fore_color = color,
                Token::Font(font) => style.font = font,
            }
        }
        x
    }

    /// Lays the whole text out inside `rect`, one wrapped line after another.
    /// Each line is offset by the alignment active when it starts, and the
    /// pen moves down by the height of the font active after it is drawn.
    pub fn layout(&self, style: LayoutStyle, rect: TextRect) -> TextLayout {
        let mut style = style;
        let mut layout = TextLayout {
            bounds: rect,
            background: style.back_color,
            border: style.border_color,
            ..TextLayout::default()
        };

        let width = rect.width();
        let mut y = rect.top;
        let mut start = 0;
        while start < self.text.len() {
            // A zero-length fit would loop forever; take one character and
            // report the line through `forced_lines`.
            let (fit, forced) = self.fit_line(&style, start, width);
            if forced {
                layout.forced_lines.push(layout.lines.len());
            }
            let text_width = self.measure_width(&style, start, fit.length);
            let offset = match style.alignment {
                Alignment::Left => 0,
                Alignment::Center => (width - text_width) / 2,
                Alignment::Right => width - text_width,
            };

            self.draw_run(
                &mut style,
                start,
                fit.length,
                rect.left + offset,
                y,
                &mut layout.glyphs,
            );
            y += self.fonts.line_height(style.font);
            layout.lines.push(fit);
            start = fit.next;
        }

        layout
    }

    /// Size of the box the text needs.
    ///
    /// `max_width == 0` wraps at three fifths of `screen_width`; a negative
    /// width lays the text out on a single line. Line heights use the
    /// starting font throughout, even when markup switches fonts.
    pub fn measure_text_size(
        &self,
        style: &LayoutStyle,
        max_width: i32,
        screen_width: i32,
    ) -> TextSize {
        let line_height = self.fonts.line_height(style.font);
        if max_width < 0 {
            return TextSize {
                width: self.measure_width(style, 0, self.text.len()),
                height: line_height + 1,
            };
        }

        let max_width = if max_width == 0 {
            screen_width * 3 / 5
        } else {
            max_width
        };

        let mut text_width = 0;
        let mut height = 0;
        let mut start = 0;
        while start < self.text.len() {
            let (fit, _) = self.fit_line(style, start, max_width);
            text_width = text_width.max(self.measure_width(style, start, fit.length));
            height += line_height;
            start = fit.next;
        }

        TextSize {
            width: text_width.min(max_width),
            height,
        }
    }
}
