//! Inline markup embedded in layout text.
//!
//! `|a<n>|` switches alignment, `|c<n>|` the foreground color and `|f<n>|`
//! the font, each from that point onward. Other directive letters are
//! skipped up to their closing `|`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Glyph(char),
    Align(u16),
    Color(u16),
    Font(u16),
}

pub const DIRECTIVE: char = '|';

/// Tokenizes a run of layout text. Measurement and drawing both walk text
/// through this iterator so they agree on what is visible.
#[derive(Debug, Clone)]
pub struct Markup<'a> {
    text: &'a [char],
    pos: usize,
}

impl<'a> Markup<'a> {
    pub fn new(text: &'a [char]) -> Self {
        Self { text, pos: 0 }
    }

    fn directive(&mut self) -> Option<Token> {
        let letter = self.text.get(self.pos).copied();
        self.pos += 1;

        let mut value: u16 = 0;
        while let Some(d) = self.text.get(self.pos).and_then(|c| c.to_digit(10)) {
            value = value.wrapping_mul(10).wrapping_add(d as u16);
            self.pos += 1;
        }

        while self.pos < self.text.len() && self.text[self.pos] != DIRECTIVE {
            self.pos += 1;
        }
        // closing bar
        self.pos += 1;

        match letter? {
            'a' => Some(Token::Align(value)),
            'c' => Some(Token::Color(value)),
            'f' => Some(Token::Font(value)),
            other => {
                log::trace!("ignoring text markup |{other}");
                None
            }
        }
    }
}

impl Iterator for Markup<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while let Some(&ch) = self.text.get(self.pos) {
            self.pos += 1;
            if ch != DIRECTIVE {
                return Some(Token::Glyph(ch));
            }
            if let Some(token) = self.directive() {
                return Some(token);
            }
        }
        None
    }
}
