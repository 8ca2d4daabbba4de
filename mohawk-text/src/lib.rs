//! mohawk-text
//!
//! Runtime text helpers used by scripts: the `%`-directive formatter, the
//! legacy number reader, text resource lookup and the word-wrapping layout
//! engine with its `|f1|`-style inline markup.

pub mod error;
pub mod format;
pub mod layout;
pub mod markup;
pub mod number;
pub mod resources;

pub use error::TextError;
pub use format::{format, FormatArg, FormatOptions, Formatter, TextSource};
pub use layout::{
    Alignment, FontMetrics, GlyphDraw, LayoutStyle, LineFit, TextLayout, TextLayouter, TextRect,
    TextSize,
};
pub use number::read_number;
pub use resources::TextResourceTable;
